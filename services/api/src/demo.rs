use crate::report::{render_dashboard, DashboardFormat};
use campus_analytics::error::AppError;
use campus_analytics::records::{
    ClassId, ClassSection, Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus,
    InMemoryRecordStore, Instructor, InstructorId, RecordSet, RecordSnapshot, RecordStore,
    Semester, Student, StudentId,
};
use campus_analytics::statistics::{Dashboard, ReportKind, ReportRows};
use chrono::NaiveDate;
use clap::Args;
use std::io::{self, Write};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Output format for the dashboard panels
    #[arg(long, value_enum, default_value_t = DashboardFormat::Table)]
    pub(crate) format: DashboardFormat,
}

const STUDENT_COUNT: u32 = 48;

const MAJORS: [&str; 5] = [
    "Computer Science",
    "Mathematics",
    "Physics",
    "Biology",
    "Economics",
];

const INSTRUCTORS: [(&str, &str, &str); 6] = [
    ("Grace", "Hopper", "Computer Science"),
    ("Edsger", "Dijkstra", "Computer Science"),
    ("Emmy", "Noether", "Mathematics"),
    ("Lise", "Meitner", "Physics"),
    ("Rosalind", "Franklin", "Biology"),
    ("Elinor", "Ostrom", "Economics"),
];

// (code, title, category, level, prerequisite position)
const COURSES: [(&str, &str, &str, &str, Option<u32>); 10] = [
    ("CS101", "Introduction to Programming", "Computer Science", "Introductory", None),
    ("CS201", "Data Structures", "Computer Science", "Intermediate", Some(1)),
    ("CS301", "Algorithms", "Computer Science", "Advanced", Some(2)),
    ("MATH101", "Calculus I", "Mathematics", "Introductory", None),
    ("MATH201", "Linear Algebra", "Mathematics", "Intermediate", Some(4)),
    ("PHYS101", "Classical Mechanics", "Physics", "Introductory", Some(4)),
    ("PHYS201", "Electromagnetism", "Physics", "Intermediate", Some(6)),
    ("BIO101", "Cell Biology", "Biology", "Introductory", None),
    ("ECON101", "Principles of Microeconomics", "Economics", "Introductory", None),
    ("ECON201", "Game Theory", "Economics", "Intermediate", Some(9)),
];

const TERMS: [(Semester, i32); 5] = [
    (Semester::Fall, 2022),
    (Semester::Spring, 2023),
    (Semester::Summer, 2023),
    (Semester::Fall, 2023),
    (Semester::Spring, 2024),
];

/// Deterministic dataset used when no record source is configured.
///
/// Classes in the most recent term are still in progress, so their
/// enrollments carry no grade.
pub(crate) fn demo_records() -> RecordSet {
    let instructors: Vec<Instructor> = INSTRUCTORS
        .iter()
        .zip(1..)
        .map(|(&(first, last, department), id)| Instructor {
            id: InstructorId(id),
            first_name: first.to_string(),
            last_name: last.to_string(),
            department: department.to_string(),
        })
        .collect();

    let courses: Vec<Course> = COURSES
        .iter()
        .zip(1..)
        .map(|(&(code, title, category, level, prerequisite), id)| Course {
            id: CourseId(id),
            course_code: code.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            level: level.to_string(),
            prerequisite_id: prerequisite.map(CourseId),
        })
        .collect();

    let mut classes = Vec::new();
    for (term_index, &(semester, year)) in TERMS.iter().enumerate() {
        for course in &courses {
            if (course.id.0 as usize + term_index) % 3 == 0 {
                continue;
            }
            classes.push(ClassSection {
                id: ClassId(classes.len() as u32 + 1),
                course_id: course.id,
                instructor_id: instructor_for(&instructors, &course.category, term_index),
                semester,
                year,
            });
        }
    }

    let students: Vec<Student> = (1..=STUDENT_COUNT).map(demo_student).collect();

    let current_term = TERMS.len() - 1;
    let mut enrollments = Vec::new();
    for student in &students {
        for (position, class) in classes.iter().enumerate() {
            let seed = student.id.0 as usize * 7 + position * 3;
            if seed % 10 >= 2 {
                continue;
            }
            let in_progress = TERMS
                .iter()
                .position(|&(semester, year)| semester == class.semester && year == class.year)
                == Some(current_term);
            let (status, grade) = outcome(student.id.0 as usize, position, in_progress);
            enrollments.push(Enrollment {
                id: EnrollmentId(enrollments.len() as u32 + 1),
                student_id: student.id,
                class_id: class.id,
                status,
                grade,
            });
        }
    }

    RecordSet {
        students,
        courses,
        classes,
        instructors,
        enrollments,
    }
}

fn instructor_for(instructors: &[Instructor], category: &str, term_index: usize) -> InstructorId {
    let qualified: Vec<InstructorId> = instructors
        .iter()
        .filter(|instructor| instructor.department == category)
        .map(|instructor| instructor.id)
        .collect();
    if qualified.is_empty() {
        return InstructorId(1);
    }
    qualified[term_index % qualified.len()]
}

fn demo_student(id: u32) -> Student {
    let index = id as usize;
    let year = 2020 + (id % 4) as i32;
    let month = if id % 3 == 0 { 1 } else { 9 };
    let enrollment_date =
        NaiveDate::from_ymd_opt(year, month, 1 + id % 20).unwrap_or(NaiveDate::MIN);

    let major = (id % 11 != 0).then(|| MAJORS[(index * 3 + index / 5) % MAJORS.len()].to_string());
    let gender = if id % 7 == 0 {
        "Non-binary"
    } else if id % 2 == 0 {
        "Female"
    } else {
        "Male"
    };
    let gpa = (id % 13 != 0).then(|| 2.0 + ((id * 37) % 200) as f64 / 100.0);

    Student {
        id: StudentId(id),
        enrollment_date,
        major,
        gender: gender.to_string(),
        gpa,
    }
}

fn outcome(student: usize, position: usize, in_progress: bool) -> (EnrollmentStatus, Option<f64>) {
    let roll = (student * 31 + position * 17) % 100;
    if roll < 8 {
        return (EnrollmentStatus::Withdrawn, None);
    }
    if in_progress {
        return (EnrollmentStatus::Enrolled, None);
    }

    let grade = 45 + (roll * 7) % 55;
    let status = if grade >= 60 {
        EnrollmentStatus::Completed
    } else {
        EnrollmentStatus::Failed
    };
    (status, Some(grade as f64))
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryRecordStore::from_records(demo_records())?);
    let snapshot = store.snapshot()?;
    let dashboard = Dashboard::collect_concurrently(Arc::clone(&store)).await;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.format == DashboardFormat::Table {
        write_summary(&snapshot, &dashboard, &mut out)?;
    }

    render_dashboard(&dashboard, args.format, &mut out)?;
    out.flush()?;
    Ok(())
}

fn write_summary<W: Write>(
    snapshot: &RecordSnapshot,
    dashboard: &Dashboard,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "Campus analytics demo")?;
    writeln!(
        out,
        "- {} students | {} courses | {} classes | {} instructors | {} enrollments",
        snapshot.students().count(),
        snapshot.courses().count(),
        snapshot.classes().count(),
        snapshot.instructors().count(),
        snapshot.enrollments().count(),
    )?;

    let top_course = dashboard
        .panel(ReportKind::TopCourses)
        .and_then(|panel| panel.rows());
    if let Some(ReportRows::TopCourses(courses)) = top_course {
        if let Some(course) = courses.first() {
            writeln!(
                out,
                "- most enrolled course: {} {} ({} enrollments)",
                course.course_code, course.title, course.enrollment_count
            )?;
        }
    }

    let failed = dashboard.failed().count();
    if failed > 0 {
        writeln!(out, "- {failed} of {} reports failed", dashboard.panels.len())?;
    }
    writeln!(out)
}
