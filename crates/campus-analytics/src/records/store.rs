use super::domain::RecordSet;
use super::import::ImportError;
use super::snapshot::{RecordSnapshot, SnapshotError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Read access to the academic record store.
///
/// Every call hands back a consistent snapshot; reports never see a torn view
/// across entities, and nothing obtained through this trait can mutate records.
pub trait RecordStore: Send + Sync {
    fn snapshot(&self) -> Result<Arc<RecordSnapshot>, StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn snapshot(&self) -> Result<Arc<RecordSnapshot>, StoreError> {
        (**self).snapshot()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("record integrity violation: {0}")]
    Integrity(#[from] SnapshotError),
    #[error("record store lock poisoned")]
    Poisoned,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Holds a prepared snapshot in memory; writers swap in a whole new snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    current: Arc<RwLock<Arc<RecordSnapshot>>>,
}

impl InMemoryRecordStore {
    pub fn new(snapshot: RecordSnapshot) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    pub fn from_records(records: RecordSet) -> Result<Self, StoreError> {
        Ok(Self::new(RecordSnapshot::build(records)?))
    }

    /// Publishes a new snapshot. Reports already running keep the one they hold.
    pub fn replace(&self, snapshot: RecordSnapshot) -> Result<(), StoreError> {
        let mut guard = self.current.write().map_err(|_| StoreError::Poisoned)?;
        *guard = Arc::new(snapshot);
        Ok(())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn snapshot(&self) -> Result<Arc<RecordSnapshot>, StoreError> {
        let guard = self.current.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Arc::clone(&guard))
    }
}

/// Re-reads records from disk on every snapshot.
///
/// A directory is read as one CSV file per entity; any other path is read as a
/// single JSON document.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<RecordSet, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::Unavailable(format!(
                "{} does not exist",
                self.path.display()
            )));
        }

        let records = if self.path.is_dir() {
            RecordSet::from_csv_dir(&self.path)?
        } else {
            RecordSet::from_json_path(&self.path)?
        };
        Ok(records)
    }
}

impl RecordStore for FileRecordStore {
    fn snapshot(&self) -> Result<Arc<RecordSnapshot>, StoreError> {
        let records = self.load()?;
        let snapshot = RecordSnapshot::build(records)?;
        Ok(Arc::new(snapshot))
    }
}
