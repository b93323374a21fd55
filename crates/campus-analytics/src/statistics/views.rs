use super::keys::GradeLetter;
use crate::records::{CourseId, EnrollmentStatus, InstructorId, Semester};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MajorCount {
    pub major: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenderCount {
    pub gender: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEnrollment {
    pub course_id: CourseId,
    pub course_code: String,
    pub title: String,
    pub enrollment_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEnrollment {
    pub category: String,
    pub enrollment_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorGpa {
    pub major: String,
    #[serde(rename = "averageGPA")]
    pub average_gpa: f64,
    pub student_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBucket {
    pub grade_letter: GradeLetter,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSuccess {
    pub course_code: String,
    pub title: String,
    pub pass_count: usize,
    pub fail_count: usize,
    pub total_count: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: EnrollmentStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorLoad {
    pub instructor_id: InstructorId,
    pub full_name: String,
    pub department: String,
    pub class_count: usize,
    pub unique_course_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermEnrollment {
    pub semester: Semester,
    pub year: i32,
    pub term: String,
    pub enrollment_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryClassSize {
    pub category: String,
    pub average_class_size: f64,
    pub class_count: usize,
}
