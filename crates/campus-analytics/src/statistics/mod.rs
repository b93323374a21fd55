//! Fixed catalogue of dashboard reports over a record snapshot.
//!
//! Each report is an independent pure function of [`RecordSnapshot`]; the
//! catalogue maps report names to them and the router serves them over HTTP.
//!
//! [`RecordSnapshot`]: crate::records::RecordSnapshot

mod catalogue;
pub mod courses;
mod dashboard;
pub mod enrollments;
pub mod instructors;
pub mod keys;
pub mod router;
pub mod students;
pub mod views;

pub use catalogue::{run_kind, run_report, ReportError, ReportKind, ReportRows, DEFAULT_LIMIT};
pub use dashboard::{Dashboard, DashboardPanel, PanelOutcome};
pub use keys::{GradeLetter, Term};
pub use router::statistics_router;
