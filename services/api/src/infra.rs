use crate::demo::demo_records;
use campus_analytics::error::AppError;
use campus_analytics::records::{
    FileRecordStore, InMemoryRecordStore, RecordSnapshot, RecordStore, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Record store selected at startup: a file or CSV directory when a data path
/// is configured, otherwise the bundled demo dataset held in memory.
#[derive(Debug, Clone)]
pub(crate) enum ConfiguredStore {
    File(FileRecordStore),
    Demo(InMemoryRecordStore),
}

impl ConfiguredStore {
    pub(crate) fn open(records_path: Option<PathBuf>) -> Result<Self, AppError> {
        match records_path {
            Some(path) => Ok(Self::File(FileRecordStore::new(path))),
            None => Ok(Self::Demo(InMemoryRecordStore::from_records(demo_records())?)),
        }
    }
}

impl RecordStore for ConfiguredStore {
    fn snapshot(&self) -> Result<Arc<RecordSnapshot>, StoreError> {
        match self {
            Self::File(store) => store.snapshot(),
            Self::Demo(store) => store.snapshot(),
        }
    }
}

impl fmt::Display for ConfiguredStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(store) => write!(f, "{}", store.path().display()),
            Self::Demo(_) => f.write_str("bundled demo dataset"),
        }
    }
}
