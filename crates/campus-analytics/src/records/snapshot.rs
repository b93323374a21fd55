use super::domain::{
    ClassId, ClassSection, Course, CourseId, Enrollment, EnrollmentId, Instructor, InstructorId,
    RecordSet, Student, StudentId,
};
use std::collections::HashMap;
use std::hash::Hash;

/// Integrity violations found while indexing a [`RecordSet`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("duplicate {entity} id {id}")]
    DuplicateId { entity: &'static str, id: u32 },
    #[error("{entity} {id} references missing {target} {target_id} via {field}")]
    DanglingReference {
        entity: &'static str,
        id: u32,
        field: &'static str,
        target: &'static str,
        target_id: u32,
    },
    #[error("{entity} {id} has {field} {value} outside {min}..={max}")]
    OutOfRange {
        entity: &'static str,
        id: u32,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Read-only, indexed view over every academic record.
///
/// Entities iterate in ascending id order. Lookups by id and by foreign key
/// are hash-indexed, so joins inside reports stay linear in the number of rows.
#[derive(Debug, Default)]
pub struct RecordSnapshot {
    students: Vec<Student>,
    courses: Vec<Course>,
    classes: Vec<ClassSection>,
    instructors: Vec<Instructor>,
    enrollments: Vec<Enrollment>,
    student_index: HashMap<StudentId, usize>,
    course_index: HashMap<CourseId, usize>,
    class_index: HashMap<ClassId, usize>,
    instructor_index: HashMap<InstructorId, usize>,
    enrollment_index: HashMap<EnrollmentId, usize>,
    enrollments_by_class: HashMap<ClassId, Vec<usize>>,
    classes_by_instructor: HashMap<InstructorId, Vec<usize>>,
}

impl RecordSnapshot {
    pub fn build(records: RecordSet) -> Result<Self, SnapshotError> {
        let RecordSet {
            mut students,
            mut courses,
            mut classes,
            mut instructors,
            mut enrollments,
        } = records;

        students.sort_by_key(|student| student.id);
        courses.sort_by_key(|course| course.id);
        classes.sort_by_key(|class| class.id);
        instructors.sort_by_key(|instructor| instructor.id);
        enrollments.sort_by_key(|enrollment| enrollment.id);

        let student_index = index_by("student", &students, |s| (s.id, s.id.0))?;
        let course_index = index_by("course", &courses, |c| (c.id, c.id.0))?;
        let class_index = index_by("class", &classes, |c| (c.id, c.id.0))?;
        let instructor_index = index_by("instructor", &instructors, |i| (i.id, i.id.0))?;
        let enrollment_index = index_by("enrollment", &enrollments, |e| (e.id, e.id.0))?;

        for student in &students {
            if let Some(gpa) = student.gpa {
                check_range("student", student.id.0, "gpa", gpa, 0.0, 4.0)?;
            }
        }

        for course in &courses {
            if let Some(prerequisite) = course.prerequisite_id {
                if !course_index.contains_key(&prerequisite) {
                    return Err(SnapshotError::DanglingReference {
                        entity: "course",
                        id: course.id.0,
                        field: "prerequisiteId",
                        target: "course",
                        target_id: prerequisite.0,
                    });
                }
            }
        }

        let mut classes_by_instructor: HashMap<InstructorId, Vec<usize>> = HashMap::new();
        for (position, class) in classes.iter().enumerate() {
            if !course_index.contains_key(&class.course_id) {
                return Err(SnapshotError::DanglingReference {
                    entity: "class",
                    id: class.id.0,
                    field: "courseId",
                    target: "course",
                    target_id: class.course_id.0,
                });
            }
            if !instructor_index.contains_key(&class.instructor_id) {
                return Err(SnapshotError::DanglingReference {
                    entity: "class",
                    id: class.id.0,
                    field: "instructorId",
                    target: "instructor",
                    target_id: class.instructor_id.0,
                });
            }
            classes_by_instructor
                .entry(class.instructor_id)
                .or_default()
                .push(position);
        }

        let mut enrollments_by_class: HashMap<ClassId, Vec<usize>> = HashMap::new();
        for (position, enrollment) in enrollments.iter().enumerate() {
            if !student_index.contains_key(&enrollment.student_id) {
                return Err(SnapshotError::DanglingReference {
                    entity: "enrollment",
                    id: enrollment.id.0,
                    field: "studentId",
                    target: "student",
                    target_id: enrollment.student_id.0,
                });
            }
            if !class_index.contains_key(&enrollment.class_id) {
                return Err(SnapshotError::DanglingReference {
                    entity: "enrollment",
                    id: enrollment.id.0,
                    field: "classId",
                    target: "class",
                    target_id: enrollment.class_id.0,
                });
            }
            if let Some(grade) = enrollment.grade {
                check_range("enrollment", enrollment.id.0, "grade", grade, 0.0, 100.0)?;
            }
            enrollments_by_class
                .entry(enrollment.class_id)
                .or_default()
                .push(position);
        }

        Ok(Self {
            students,
            courses,
            classes,
            instructors,
            enrollments,
            student_index,
            course_index,
            class_index,
            instructor_index,
            enrollment_index,
            enrollments_by_class,
            classes_by_instructor,
        })
    }

    pub fn students(&self) -> impl Iterator<Item = &Student> + '_ {
        self.students.iter()
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> + '_ {
        self.courses.iter()
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassSection> + '_ {
        self.classes.iter()
    }

    pub fn instructors(&self) -> impl Iterator<Item = &Instructor> + '_ {
        self.instructors.iter()
    }

    pub fn enrollments(&self) -> impl Iterator<Item = &Enrollment> + '_ {
        self.enrollments.iter()
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.student_index.get(&id).map(|&i| &self.students[i])
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.course_index.get(&id).map(|&i| &self.courses[i])
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassSection> {
        self.class_index.get(&id).map(|&i| &self.classes[i])
    }

    pub fn instructor(&self, id: InstructorId) -> Option<&Instructor> {
        self.instructor_index.get(&id).map(|&i| &self.instructors[i])
    }

    pub fn enrollment(&self, id: EnrollmentId) -> Option<&Enrollment> {
        self.enrollment_index.get(&id).map(|&i| &self.enrollments[i])
    }

    pub fn course_of(&self, class: &ClassSection) -> Option<&Course> {
        self.course(class.course_id)
    }

    pub fn instructor_of(&self, class: &ClassSection) -> Option<&Instructor> {
        self.instructor(class.instructor_id)
    }

    pub fn student_of(&self, enrollment: &Enrollment) -> Option<&Student> {
        self.student(enrollment.student_id)
    }

    pub fn class_of(&self, enrollment: &Enrollment) -> Option<&ClassSection> {
        self.class(enrollment.class_id)
    }

    pub fn enrollments_for_class(&self, id: ClassId) -> impl Iterator<Item = &Enrollment> + '_ {
        self.enrollments_by_class
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&i| &self.enrollments[i])
    }

    pub fn classes_for_instructor(
        &self,
        id: InstructorId,
    ) -> impl Iterator<Item = &ClassSection> + '_ {
        self.classes_by_instructor
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&i| &self.classes[i])
    }
}

fn index_by<T, K, F>(
    entity: &'static str,
    items: &[T],
    key: F,
) -> Result<HashMap<K, usize>, SnapshotError>
where
    K: Eq + Hash,
    F: Fn(&T) -> (K, u32),
{
    let mut index = HashMap::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let (id, raw) = key(item);
        if index.insert(id, position).is_some() {
            return Err(SnapshotError::DuplicateId { entity, id: raw });
        }
    }
    Ok(index)
}

fn check_range(
    entity: &'static str,
    id: u32,
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), SnapshotError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SnapshotError::OutOfRange {
            entity,
            id,
            field,
            value,
            min,
            max,
        })
    }
}
