use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(StudentId);
record_id!(CourseId);
record_id!(ClassId);
record_id!(InstructorId);
record_id!(EnrollmentId);

/// Academic term within a year. Variant order is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Semester {
    Spring,
    Summer,
    Fall,
}

impl Semester {
    pub const fn ordered() -> [Self; 3] {
        [Self::Spring, Self::Summer, Self::Fall]
    }

    /// Position within the academic year: Spring=1, Summer=2, Fall=3.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Spring => 1,
            Self::Summer => 2,
            Self::Fall => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Withdrawn,
    Failed,
}

impl EnrollmentStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Enrolled,
            Self::Completed,
            Self::Withdrawn,
            Self::Failed,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Enrolled => "ENROLLED",
            Self::Completed => "COMPLETED",
            Self::Withdrawn => "WITHDRAWN",
            Self::Failed => "FAILED",
        }
    }

    /// Completed and failed enrollments carry a final outcome.
    pub const fn is_concluded(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    #[serde(deserialize_with = "deserialize_date")]
    pub enrollment_date: NaiveDate,
    #[serde(default)]
    pub major: Option<String>,
    pub gender: String,
    #[serde(default)]
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub course_code: String,
    pub title: String,
    pub category: String,
    pub level: String,
    #[serde(default)]
    pub prerequisite_id: Option<CourseId>,
}

/// A scheduled section of a course, taught by one instructor in one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSection {
    pub id: ClassId,
    pub course_id: CourseId,
    pub instructor_id: InstructorId,
    pub semester: Semester,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: InstructorId,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
}

impl Instructor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub status: EnrollmentStatus,
    #[serde(default)]
    pub grade: Option<f64>,
}

/// Raw entity collections as they arrive from a data source, before indexing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub classes: Vec<ClassSection>,
    #[serde(default)]
    pub instructors: Vec<Instructor>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only the date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| timestamp.date_naive())
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD or RFC 3339 ({err})"))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}
