use super::keys::{GradeLetter, Term};
use super::views::{GradeBucket, StatusCount, TermEnrollment};
use crate::records::{EnrollmentStatus, RecordSnapshot};
use std::collections::BTreeMap;

/// Graded enrollments bucketed by letter, always listed A, B, C, D, F.
/// Letters nobody earned are omitted rather than reported as zero.
pub fn grade_distribution(snapshot: &RecordSnapshot) -> Vec<GradeBucket> {
    let mut buckets: BTreeMap<GradeLetter, usize> = BTreeMap::new();
    for grade in snapshot.enrollments().filter_map(|e| e.grade) {
        *buckets.entry(GradeLetter::from_grade(grade)).or_default() += 1;
    }

    GradeLetter::ordered()
        .into_iter()
        .filter_map(|letter| {
            buckets.get(&letter).map(|&count| GradeBucket {
                grade_letter: letter,
                count,
            })
        })
        .collect()
}

pub fn enrollment_status_distribution(snapshot: &RecordSnapshot) -> Vec<StatusCount> {
    let mut counts: BTreeMap<EnrollmentStatus, usize> = BTreeMap::new();
    for enrollment in snapshot.enrollments() {
        *counts.entry(enrollment.status).or_default() += 1;
    }

    let mut rows: Vec<StatusCount> = counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Enrollments per term in calendar order (Spring, Summer, Fall within a year).
pub fn enrollment_trends_by_semester(snapshot: &RecordSnapshot) -> Vec<TermEnrollment> {
    let mut terms: BTreeMap<Term, usize> = BTreeMap::new();
    for enrollment in snapshot.enrollments() {
        if let Some(class) = snapshot.class_of(enrollment) {
            *terms
                .entry(Term::new(class.semester, class.year))
                .or_default() += 1;
        }
    }

    terms
        .into_iter()
        .map(|(term, count)| TermEnrollment {
            semester: term.semester,
            year: term.year,
            term: term.to_string(),
            enrollment_count: count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{
        ClassId, ClassSection, Course, CourseId, Enrollment, EnrollmentId, Instructor,
        InstructorId, RecordSet, Semester, Student, StudentId,
    };
    use chrono::NaiveDate;

    fn base_records() -> RecordSet {
        RecordSet {
            students: vec![Student {
                id: StudentId(1),
                enrollment_date: NaiveDate::from_ymd_opt(2023, 1, 9).expect("valid date"),
                major: Some("Finance".to_string()),
                gender: "Male".to_string(),
                gpa: Some(2.9),
            }],
            courses: vec![Course {
                id: CourseId(1),
                course_code: "BUS300-1".to_string(),
                title: "Course 1 Title".to_string(),
                category: "Major Specific".to_string(),
                level: "300".to_string(),
                prerequisite_id: None,
            }],
            instructors: vec![Instructor {
                id: InstructorId(1),
                first_name: "Instructor1First".to_string(),
                last_name: "Instructor1Last".to_string(),
                department: "Business".to_string(),
            }],
            ..RecordSet::default()
        }
    }

    fn class(id: u32, semester: Semester, year: i32) -> ClassSection {
        ClassSection {
            id: ClassId(id),
            course_id: CourseId(1),
            instructor_id: InstructorId(1),
            semester,
            year,
        }
    }

    fn enrollment(id: u32, class: u32, status: EnrollmentStatus, grade: Option<f64>) -> Enrollment {
        Enrollment {
            id: EnrollmentId(id),
            student_id: StudentId(1),
            class_id: ClassId(class),
            status,
            grade,
        }
    }

    #[test]
    fn grade_distribution_uses_fixed_letter_order() {
        let mut records = base_records();
        records.classes.push(class(1, Semester::Fall, 2023));
        let grades = [12.0, 95.0, 61.0, 90.0, 45.5, 89.9];
        records.enrollments = grades
            .iter()
            .enumerate()
            .map(|(i, &grade)| {
                enrollment(i as u32 + 1, 1, EnrollmentStatus::Completed, Some(grade))
            })
            .collect();
        records
            .enrollments
            .push(enrollment(99, 1, EnrollmentStatus::Enrolled, None));
        let snapshot = RecordSnapshot::build(records).expect("snapshot builds");

        let rows = grade_distribution(&snapshot);
        let letters: Vec<(GradeLetter, usize)> =
            rows.iter().map(|r| (r.grade_letter, r.count)).collect();
        assert_eq!(
            letters,
            vec![
                (GradeLetter::A, 2),
                (GradeLetter::B, 1),
                (GradeLetter::D, 1),
                (GradeLetter::F, 2),
            ]
        );
        assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), grades.len());
    }

    #[test]
    fn status_distribution_orders_by_count() {
        let mut records = base_records();
        records.classes.push(class(1, Semester::Spring, 2024));
        records.enrollments = vec![
            enrollment(1, 1, EnrollmentStatus::Withdrawn, None),
            enrollment(2, 1, EnrollmentStatus::Completed, Some(81.0)),
            enrollment(3, 1, EnrollmentStatus::Completed, Some(72.0)),
            enrollment(4, 1, EnrollmentStatus::Completed, Some(64.0)),
            enrollment(5, 1, EnrollmentStatus::Failed, Some(22.0)),
            enrollment(6, 1, EnrollmentStatus::Failed, Some(18.0)),
        ];
        let snapshot = RecordSnapshot::build(records).expect("snapshot builds");

        assert_eq!(
            enrollment_status_distribution(&snapshot),
            vec![
                StatusCount {
                    status: EnrollmentStatus::Completed,
                    count: 3
                },
                StatusCount {
                    status: EnrollmentStatus::Failed,
                    count: 2
                },
                StatusCount {
                    status: EnrollmentStatus::Withdrawn,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn trends_are_chronological_not_lexicographic() {
        let mut records = base_records();
        records.classes = vec![
            class(1, Semester::Fall, 2023),
            class(2, Semester::Spring, 2024),
            class(3, Semester::Summer, 2023),
        ];
        records.enrollments = vec![
            enrollment(1, 1, EnrollmentStatus::Enrolled, None),
            enrollment(2, 2, EnrollmentStatus::Enrolled, None),
            enrollment(3, 2, EnrollmentStatus::Enrolled, None),
            enrollment(4, 3, EnrollmentStatus::Enrolled, None),
        ];
        let snapshot = RecordSnapshot::build(records).expect("snapshot builds");

        let rows = enrollment_trends_by_semester(&snapshot);
        let terms: Vec<(&str, usize)> = rows
            .iter()
            .map(|r| (r.term.as_str(), r.enrollment_count))
            .collect();
        assert_eq!(
            terms,
            vec![("Summer 2023", 1), ("Fall 2023", 1), ("Spring 2024", 2)]
        );
        assert_eq!(rows[2].semester, Semester::Spring);
        assert_eq!(rows[2].year, 2024);
    }

    #[test]
    fn trends_skip_terms_without_enrollments() {
        let mut records = base_records();
        records.classes = vec![class(1, Semester::Fall, 2025), class(2, Semester::Spring, 2025)];
        records.enrollments = vec![enrollment(1, 2, EnrollmentStatus::Enrolled, None)];
        let snapshot = RecordSnapshot::build(records).expect("snapshot builds");

        let rows = enrollment_trends_by_semester(&snapshot);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].term, "Spring 2025");
    }
}
