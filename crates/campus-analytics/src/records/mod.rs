//! Academic records: entity types, indexed snapshots and the stores that serve them.

pub mod domain;
pub mod import;
pub mod snapshot;
pub mod store;

pub use domain::{
    ClassId, ClassSection, Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus,
    Instructor, InstructorId, RecordSet, Semester, Student, StudentId,
};
pub use import::ImportError;
pub use snapshot::{RecordSnapshot, SnapshotError};
pub use store::{FileRecordStore, InMemoryRecordStore, RecordStore, StoreError};
