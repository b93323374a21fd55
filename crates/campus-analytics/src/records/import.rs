use super::domain::RecordSet;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const STUDENTS_FILE: &str = "students.csv";
pub const COURSES_FILE: &str = "courses.csv";
pub const CLASSES_FILE: &str = "classes.csv";
pub const INSTRUCTORS_FILE: &str = "instructors.csv";
pub const ENROLLMENTS_FILE: &str = "enrollments.csv";

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read record export {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid CSV data in {path}: {source}")]
    Csv { path: String, source: csv::Error },
    #[error("invalid JSON record export: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecordSet {
    /// Reads a single JSON document holding all five collections.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, ImportError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ImportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_reader(file)
    }

    /// Reads one CSV file per entity from `dir`. Every file must be present;
    /// an empty file with only a header row yields an empty collection.
    pub fn from_csv_dir(dir: impl AsRef<Path>) -> Result<Self, ImportError> {
        let dir = dir.as_ref();
        Ok(Self {
            students: read_csv(&dir.join(STUDENTS_FILE))?,
            courses: read_csv(&dir.join(COURSES_FILE))?,
            classes: read_csv(&dir.join(CLASSES_FILE))?,
            instructors: read_csv(&dir.join(INSTRUCTORS_FILE))?,
            enrollments: read_csv(&dir.join(ENROLLMENTS_FILE))?,
        })
    }
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ImportError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: display.clone(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|source| ImportError::Csv {
            path: display,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::domain::{EnrollmentStatus, Semester};
    use std::fs;

    const STUDENTS: &str = "id,enrollmentDate,major,gender,gpa\n1,2019-09-01,Biology,Female,3.1\n2,2020-01-15T08:00:00Z,,Male,\n";
    const COURSES: &str = "id,courseCode,title,category,level,prerequisiteId\n1,BIO100-1,Cells,Core,100,\n2,BIO200-2,Genetics,Elective,200,1\n";
    const CLASSES: &str = "id,courseId,instructorId,semester,year\n1,2,1,Summer,2024\n";
    const INSTRUCTORS: &str = "id,firstName,lastName,department\n1,Grace,Hopper,Mathematics\n";
    const ENROLLMENTS: &str =
        "id,studentId,classId,status,grade\n1,1,1,COMPLETED,91.5\n2,2,1,ENROLLED,\n";

    fn write_fixture(dir: &Path) {
        fs::write(dir.join(STUDENTS_FILE), STUDENTS).expect("write students");
        fs::write(dir.join(COURSES_FILE), COURSES).expect("write courses");
        fs::write(dir.join(CLASSES_FILE), CLASSES).expect("write classes");
        fs::write(dir.join(INSTRUCTORS_FILE), INSTRUCTORS).expect("write instructors");
        fs::write(dir.join(ENROLLMENTS_FILE), ENROLLMENTS).expect("write enrollments");
    }

    #[test]
    fn csv_directory_populates_every_collection() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_fixture(dir.path());

        let records = RecordSet::from_csv_dir(dir.path()).expect("csv import");

        assert_eq!(records.students.len(), 2);
        assert!(records.students[1].major.is_none());
        assert!(records.students[1].gpa.is_none());
        assert_eq!(records.courses[1].prerequisite_id.map(|id| id.0), Some(1));
        assert_eq!(records.classes[0].semester, Semester::Summer);
        assert_eq!(records.instructors[0].full_name(), "Grace Hopper");
        assert_eq!(records.enrollments[0].status, EnrollmentStatus::Completed);
        assert_eq!(records.enrollments[1].grade, None);
    }

    #[test]
    fn missing_csv_file_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_fixture(dir.path());
        fs::remove_file(dir.path().join(CLASSES_FILE)).expect("remove classes");

        match RecordSet::from_csv_dir(dir.path()) {
            Err(ImportError::Io { path, .. }) => assert!(path.ends_with(CLASSES_FILE)),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn json_document_allows_missing_collections() {
        let records = RecordSet::from_json_reader(
            r#"{"instructors":[{"id":4,"firstName":"Alan","lastName":"Turing","department":"Computer Science"}]}"#
                .as_bytes(),
        )
        .expect("json import");

        assert!(records.students.is_empty());
        assert_eq!(records.instructors.len(), 1);
    }
}
