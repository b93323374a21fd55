use super::keys::{round2, PASSING_GRADE};
use super::views::{CategoryClassSize, CategoryEnrollment, CourseEnrollment, CourseSuccess};
use crate::records::{Course, CourseId, EnrollmentStatus, RecordSnapshot};
use std::collections::{BTreeMap, HashMap};

/// Courses with the most enrollments across all of their classes.
///
/// Courses without any enrollment do not appear. Ties go to the higher course id.
pub fn top_courses_by_enrollment(snapshot: &RecordSnapshot, limit: usize) -> Vec<CourseEnrollment> {
    let mut counts: HashMap<CourseId, usize> = HashMap::new();
    for enrollment in snapshot.enrollments() {
        if let Some(class) = snapshot.class_of(enrollment) {
            *counts.entry(class.course_id).or_default() += 1;
        }
    }

    let mut rows: Vec<CourseEnrollment> = counts
        .into_iter()
        .filter_map(|(course_id, count)| {
            snapshot.course(course_id).map(|course| CourseEnrollment {
                course_id,
                course_code: course.course_code.clone(),
                title: course.title.clone(),
                enrollment_count: count,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.enrollment_count
            .cmp(&a.enrollment_count)
            .then_with(|| b.course_id.cmp(&a.course_id))
    });
    rows.truncate(limit);
    rows
}

/// Enrollments per course category, largest first, ties by category ascending.
pub fn enrollments_by_category(snapshot: &RecordSnapshot) -> Vec<CategoryEnrollment> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for enrollment in snapshot.enrollments() {
        let course = snapshot
            .class_of(enrollment)
            .and_then(|class| snapshot.course_of(class));
        if let Some(course) = course {
            *counts.entry(course.category.as_str()).or_default() += 1;
        }
    }

    let mut rows: Vec<CategoryEnrollment> = counts
        .into_iter()
        .map(|(category, count)| CategoryEnrollment {
            category: category.to_string(),
            enrollment_count: count,
        })
        .collect();
    rows.sort_by(|a, b| b.enrollment_count.cmp(&a.enrollment_count));
    rows
}

#[derive(Debug, Default)]
struct Outcomes {
    passed: usize,
    failed: usize,
    total: usize,
}

/// Pass/fail split over concluded (completed or failed) enrollments per course.
///
/// A completed enrollment without a grade counts toward the total but is
/// neither a pass nor a fail. Courses with no concluded enrollment are omitted.
pub fn course_success_rates(snapshot: &RecordSnapshot) -> Vec<CourseSuccess> {
    let mut outcomes: BTreeMap<CourseId, Outcomes> = BTreeMap::new();
    for enrollment in snapshot.enrollments() {
        if !enrollment.status.is_concluded() {
            continue;
        }
        let Some(class) = snapshot.class_of(enrollment) else {
            continue;
        };

        let entry = outcomes.entry(class.course_id).or_default();
        entry.total += 1;
        match (enrollment.status, enrollment.grade) {
            (EnrollmentStatus::Completed, Some(grade)) if grade >= PASSING_GRADE => {
                entry.passed += 1
            }
            (EnrollmentStatus::Completed, Some(_)) | (EnrollmentStatus::Failed, _) => {
                entry.failed += 1
            }
            _ => {}
        }
    }

    let mut rows: Vec<(CourseId, CourseSuccess)> = outcomes
        .into_iter()
        .filter(|(_, outcome)| outcome.total > 0)
        .filter_map(|(course_id, outcome)| {
            let course = snapshot.course(course_id)?;
            Some((course_id, success_row(course, &outcome)))
        })
        .collect();

    rows.sort_by(|(a_id, a), (b_id, b)| {
        b.success_rate
            .total_cmp(&a.success_rate)
            .then_with(|| b_id.cmp(a_id))
    });
    rows.into_iter().map(|(_, row)| row).collect()
}

fn success_row(course: &Course, outcome: &Outcomes) -> CourseSuccess {
    CourseSuccess {
        course_code: course.course_code.clone(),
        title: course.title.clone(),
        pass_count: outcome.passed,
        fail_count: outcome.failed,
        total_count: outcome.total,
        success_rate: round2(outcome.passed as f64 * 100.0 / outcome.total as f64),
    }
}

/// Mean enrollment count per class, grouped by course category.
///
/// Only classes with at least one enrollment contribute, to the average and
/// to `class_count` alike.
pub fn average_class_size_by_category(snapshot: &RecordSnapshot) -> Vec<CategoryClassSize> {
    let mut sizes: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for class in snapshot.classes() {
        let enrolled = snapshot.enrollments_for_class(class.id).count();
        if enrolled == 0 {
            continue;
        }
        let Some(course) = snapshot.course_of(class) else {
            continue;
        };

        let entry = sizes.entry(course.category.as_str()).or_default();
        entry.0 += enrolled;
        entry.1 += 1;
    }

    let mut rows: Vec<CategoryClassSize> = sizes
        .into_iter()
        .map(|(category, (students, classes))| CategoryClassSize {
            category: category.to_string(),
            average_class_size: round2(students as f64 / classes as f64),
            class_count: classes,
        })
        .collect();
    rows.sort_by(|a, b| b.average_class_size.total_cmp(&a.average_class_size));
    rows
}
