use super::views::{
    CategoryClassSize, CategoryEnrollment, CourseEnrollment, CourseSuccess, GenderCount,
    GradeBucket, InstructorLoad, MajorCount, MajorGpa, StatusCount, TermEnrollment, YearCount,
};
use super::{courses, enrollments, instructors, students};
use crate::records::{RecordSnapshot, RecordStore, StoreError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Row cap applied by ranked reports when no positive limit is given.
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unknown report '{0}'")]
    UnknownReport(String),
    #[error("failed to read records: {0}")]
    StoreUnavailable(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportKind {
    StudentsByYear,
    StudentsByMajor,
    StudentsByGender,
    TopCourses,
    EnrollmentsByCategory,
    GpaByMajor,
    GradeDistribution,
    CourseSuccessRates,
    EnrollmentStatus,
    TopInstructors,
    EnrollmentTrends,
    ClassSize,
}

impl ReportKind {
    pub const fn ordered() -> [Self; 12] {
        [
            Self::StudentsByYear,
            Self::StudentsByMajor,
            Self::StudentsByGender,
            Self::TopCourses,
            Self::EnrollmentsByCategory,
            Self::GpaByMajor,
            Self::GradeDistribution,
            Self::CourseSuccessRates,
            Self::EnrollmentStatus,
            Self::TopInstructors,
            Self::EnrollmentTrends,
            Self::ClassSize,
        ]
    }

    /// Identifier used by the query surface and the CLI.
    pub const fn name(self) -> &'static str {
        match self {
            Self::StudentsByYear => "studentsByYear",
            Self::StudentsByMajor => "studentsByMajor",
            Self::StudentsByGender => "studentsByGender",
            Self::TopCourses => "topCourses",
            Self::EnrollmentsByCategory => "enrollmentsByCategory",
            Self::GpaByMajor => "gpaByMajor",
            Self::GradeDistribution => "gradeDistribution",
            Self::CourseSuccessRates => "courseSuccessRates",
            Self::EnrollmentStatus => "enrollmentStatus",
            Self::TopInstructors => "topInstructors",
            Self::EnrollmentTrends => "enrollmentTrends",
            Self::ClassSize => "classSize",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::StudentsByYear => "Students by Enrollment Year",
            Self::StudentsByMajor => "Students by Major",
            Self::StudentsByGender => "Students by Gender",
            Self::TopCourses => "Top Courses by Enrollment",
            Self::EnrollmentsByCategory => "Enrollments by Course Category",
            Self::GpaByMajor => "Average GPA by Major",
            Self::GradeDistribution => "Grade Distribution",
            Self::CourseSuccessRates => "Course Success Rates",
            Self::EnrollmentStatus => "Enrollment Status Distribution",
            Self::TopInstructors => "Top Instructors by Class Count",
            Self::EnrollmentTrends => "Enrollment Trends by Semester",
            Self::ClassSize => "Average Class Size by Category",
        }
    }

    pub const fn accepts_limit(self) -> bool {
        matches!(self, Self::TopCourses | Self::TopInstructors)
    }

    /// Effective row cap: positive limits pass through, anything else falls
    /// back to [`DEFAULT_LIMIT`]. `None` for reports that are never capped.
    pub fn resolve_limit(self, requested: Option<i64>) -> Option<usize> {
        if !self.accepts_limit() {
            return None;
        }
        let limit = requested
            .filter(|&value| value > 0)
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(DEFAULT_LIMIT);
        Some(limit)
    }

    /// Evaluates this report against one snapshot.
    pub fn evaluate(self, snapshot: &RecordSnapshot, limit: Option<i64>) -> ReportRows {
        let cap = self.resolve_limit(limit).unwrap_or(DEFAULT_LIMIT);
        match self {
            Self::StudentsByYear => {
                ReportRows::StudentsByYear(students::students_by_enrollment_year(snapshot))
            }
            Self::StudentsByMajor => ReportRows::StudentsByMajor(students::students_by_major(snapshot)),
            Self::StudentsByGender => {
                ReportRows::StudentsByGender(students::students_by_gender(snapshot))
            }
            Self::TopCourses => {
                ReportRows::TopCourses(courses::top_courses_by_enrollment(snapshot, cap))
            }
            Self::EnrollmentsByCategory => {
                ReportRows::EnrollmentsByCategory(courses::enrollments_by_category(snapshot))
            }
            Self::GpaByMajor => ReportRows::GpaByMajor(students::average_gpa_by_major(snapshot)),
            Self::GradeDistribution => {
                ReportRows::GradeDistribution(enrollments::grade_distribution(snapshot))
            }
            Self::CourseSuccessRates => {
                ReportRows::CourseSuccessRates(courses::course_success_rates(snapshot))
            }
            Self::EnrollmentStatus => {
                ReportRows::EnrollmentStatus(enrollments::enrollment_status_distribution(snapshot))
            }
            Self::TopInstructors => ReportRows::TopInstructors(
                instructors::top_instructors_by_class_count(snapshot, cap),
            ),
            Self::EnrollmentTrends => {
                ReportRows::EnrollmentTrends(enrollments::enrollment_trends_by_semester(snapshot))
            }
            Self::ClassSize => {
                ReportRows::ClassSize(courses::average_class_size_by_category(snapshot))
            }
        }
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let name = value.trim();
        Self::ordered()
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| ReportError::UnknownReport(name.to_string()))
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered result rows of one report. Serialises as a bare JSON array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportRows {
    StudentsByYear(Vec<YearCount>),
    StudentsByMajor(Vec<MajorCount>),
    StudentsByGender(Vec<GenderCount>),
    TopCourses(Vec<CourseEnrollment>),
    EnrollmentsByCategory(Vec<CategoryEnrollment>),
    GpaByMajor(Vec<MajorGpa>),
    GradeDistribution(Vec<GradeBucket>),
    CourseSuccessRates(Vec<CourseSuccess>),
    EnrollmentStatus(Vec<StatusCount>),
    TopInstructors(Vec<InstructorLoad>),
    EnrollmentTrends(Vec<TermEnrollment>),
    ClassSize(Vec<CategoryClassSize>),
}

impl ReportRows {
    pub const fn kind(&self) -> ReportKind {
        match self {
            Self::StudentsByYear(_) => ReportKind::StudentsByYear,
            Self::StudentsByMajor(_) => ReportKind::StudentsByMajor,
            Self::StudentsByGender(_) => ReportKind::StudentsByGender,
            Self::TopCourses(_) => ReportKind::TopCourses,
            Self::EnrollmentsByCategory(_) => ReportKind::EnrollmentsByCategory,
            Self::GpaByMajor(_) => ReportKind::GpaByMajor,
            Self::GradeDistribution(_) => ReportKind::GradeDistribution,
            Self::CourseSuccessRates(_) => ReportKind::CourseSuccessRates,
            Self::EnrollmentStatus(_) => ReportKind::EnrollmentStatus,
            Self::TopInstructors(_) => ReportKind::TopInstructors,
            Self::EnrollmentTrends(_) => ReportKind::EnrollmentTrends,
            Self::ClassSize(_) => ReportKind::ClassSize,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::StudentsByYear(rows) => rows.len(),
            Self::StudentsByMajor(rows) => rows.len(),
            Self::StudentsByGender(rows) => rows.len(),
            Self::TopCourses(rows) => rows.len(),
            Self::EnrollmentsByCategory(rows) => rows.len(),
            Self::GpaByMajor(rows) => rows.len(),
            Self::GradeDistribution(rows) => rows.len(),
            Self::CourseSuccessRates(rows) => rows.len(),
            Self::EnrollmentStatus(rows) => rows.len(),
            Self::TopInstructors(rows) => rows.len(),
            Self::EnrollmentTrends(rows) => rows.len(),
            Self::ClassSize(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Looks up `name` in the catalogue and runs it against a fresh snapshot.
///
/// The name is resolved before the store is touched, so an unknown report never
/// reads records. Store failures propagate unchanged and no rows are returned.
pub fn run_report<S>(store: &S, name: &str, limit: Option<i64>) -> Result<ReportRows, ReportError>
where
    S: RecordStore + ?Sized,
{
    let kind: ReportKind = name.parse()?;
    run_kind(store, kind, limit)
}

pub fn run_kind<S>(store: &S, kind: ReportKind, limit: Option<i64>) -> Result<ReportRows, ReportError>
where
    S: RecordStore + ?Sized,
{
    let snapshot = store.snapshot().map_err(|err| {
        warn!(report = kind.name(), error = %err, "record snapshot unavailable");
        err
    })?;

    let rows = kind.evaluate(&snapshot, limit);
    debug!(
        report = kind.name(),
        limit = ?kind.resolve_limit(limit),
        rows = rows.len(),
        "report evaluated"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_parse() {
        for kind in ReportKind::ordered() {
            assert_eq!(kind.name().parse::<ReportKind>().expect("known name"), kind);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        match "doesNotExist".parse::<ReportKind>() {
            Err(ReportError::UnknownReport(name)) => assert_eq!(name, "doesNotExist"),
            other => panic!("expected unknown report, got {other:?}"),
        }
        assert!("TopCourses".parse::<ReportKind>().is_err());
    }

    #[test]
    fn limits_fall_back_to_default() {
        let kind = ReportKind::TopCourses;
        assert_eq!(kind.resolve_limit(Some(3)), Some(3));
        assert_eq!(kind.resolve_limit(Some(0)), Some(DEFAULT_LIMIT));
        assert_eq!(kind.resolve_limit(Some(-4)), Some(DEFAULT_LIMIT));
        assert_eq!(kind.resolve_limit(None), Some(DEFAULT_LIMIT));
        assert_eq!(ReportKind::ClassSize.resolve_limit(Some(3)), None);
    }

    #[test]
    fn only_ranked_reports_accept_limits() {
        let ranked: Vec<ReportKind> = ReportKind::ordered()
            .into_iter()
            .filter(|kind| kind.accepts_limit())
            .collect();
        assert_eq!(ranked, vec![ReportKind::TopCourses, ReportKind::TopInstructors]);
    }

    #[test]
    fn empty_snapshot_evaluates_to_empty_rows() {
        let snapshot = RecordSnapshot::default();
        for kind in ReportKind::ordered() {
            let rows = kind.evaluate(&snapshot, None);
            assert_eq!(rows.kind(), kind);
            assert!(rows.is_empty(), "{kind} should be empty");
        }
    }
}
