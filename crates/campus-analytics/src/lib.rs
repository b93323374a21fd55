//! Analytics aggregation engine over academic records.
//!
//! [`records`] holds the five entity types and the read-only stores that serve
//! consistent snapshots of them; [`statistics`] turns a snapshot into the fixed
//! catalogue of dashboard reports.

pub mod config;
pub mod error;
pub mod records;
pub mod statistics;
pub mod telemetry;
