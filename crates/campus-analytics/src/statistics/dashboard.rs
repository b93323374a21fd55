use super::catalogue::{run_kind, ReportError, ReportKind, ReportRows};
use crate::records::RecordStore;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::warn;

/// Outcome of one report on the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelOutcome {
    Ready { rows: ReportRows },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardPanel {
    pub report: ReportKind,
    pub title: &'static str,
    #[serde(flatten)]
    pub outcome: PanelOutcome,
}

impl DashboardPanel {
    fn from_result(kind: ReportKind, result: Result<ReportRows, ReportError>) -> Self {
        let outcome = match result {
            Ok(rows) => PanelOutcome::Ready { rows },
            Err(err) => {
                warn!(report = kind.name(), error = %err, "dashboard panel failed");
                PanelOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };
        Self {
            report: kind,
            title: kind.title(),
            outcome,
        }
    }

    pub fn rows(&self) -> Option<&ReportRows> {
        match &self.outcome {
            PanelOutcome::Ready { rows } => Some(rows),
            PanelOutcome::Failed { .. } => None,
        }
    }
}

/// Every catalogue report in catalogue order, each computed on its own
/// snapshot so one failure does not hide the other panels.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub panels: Vec<DashboardPanel>,
}

impl Dashboard {
    pub fn collect<S>(store: &S) -> Self
    where
        S: RecordStore + ?Sized,
    {
        let panels = ReportKind::ordered()
            .into_iter()
            .map(|kind| DashboardPanel::from_result(kind, run_kind(store, kind, None)))
            .collect();
        Self { panels }
    }

    /// Runs the reports in parallel on the blocking pool and restores
    /// catalogue order afterwards.
    pub async fn collect_concurrently<S>(store: Arc<S>) -> Self
    where
        S: RecordStore + ?Sized + 'static,
    {
        let mut tasks = JoinSet::new();
        for (position, kind) in ReportKind::ordered().into_iter().enumerate() {
            let store = Arc::clone(&store);
            tasks.spawn_blocking(move || (position, kind, run_kind(store.as_ref(), kind, None)));
        }

        let mut slots: Vec<Option<DashboardPanel>> = vec![None; ReportKind::ordered().len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, kind, result)) => {
                    slots[position] = Some(DashboardPanel::from_result(kind, result));
                }
                Err(err) => warn!(error = %err, "dashboard task aborted"),
            }
        }

        let panels = slots
            .into_iter()
            .zip(ReportKind::ordered())
            .map(|(slot, kind)| {
                slot.unwrap_or_else(|| DashboardPanel {
                    report: kind,
                    title: kind.title(),
                    outcome: PanelOutcome::Failed {
                        error: "report task did not complete".to_string(),
                    },
                })
            })
            .collect();
        Self { panels }
    }

    pub fn panel(&self, kind: ReportKind) -> Option<&DashboardPanel> {
        self.panels.iter().find(|panel| panel.report == kind)
    }

    pub fn failed(&self) -> impl Iterator<Item = &DashboardPanel> + '_ {
        self.panels
            .iter()
            .filter(|panel| matches!(panel.outcome, PanelOutcome::Failed { .. }))
    }
}
