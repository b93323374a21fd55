use super::views::InstructorLoad;
use crate::records::{CourseId, RecordSnapshot};
use std::collections::HashSet;

/// Instructors ranked by number of classes taught, with the count of distinct
/// courses behind those classes. Instructors without classes are omitted.
pub fn top_instructors_by_class_count(
    snapshot: &RecordSnapshot,
    limit: usize,
) -> Vec<InstructorLoad> {
    let mut rows: Vec<InstructorLoad> = snapshot
        .instructors()
        .filter_map(|instructor| {
            let mut class_count = 0;
            let mut courses: HashSet<CourseId> = HashSet::new();
            for class in snapshot.classes_for_instructor(instructor.id) {
                if snapshot.course_of(class).is_some() {
                    class_count += 1;
                    courses.insert(class.course_id);
                }
            }

            (class_count > 0).then(|| InstructorLoad {
                instructor_id: instructor.id,
                full_name: instructor.full_name(),
                department: instructor.department.clone(),
                class_count,
                unique_course_count: courses.len(),
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.class_count
            .cmp(&a.class_count)
            .then_with(|| b.instructor_id.cmp(&a.instructor_id))
    });
    rows.truncate(limit);
    rows
}
