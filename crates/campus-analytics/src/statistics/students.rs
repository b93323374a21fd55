use super::keys::round2;
use super::views::{GenderCount, MajorCount, MajorGpa, YearCount};
use crate::records::RecordSnapshot;
use chrono::Datelike;
use std::collections::BTreeMap;

/// Students per calendar year of enrollment, oldest year first.
pub fn students_by_enrollment_year(snapshot: &RecordSnapshot) -> Vec<YearCount> {
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    for student in snapshot.students() {
        *years.entry(student.enrollment_date.year()).or_default() += 1;
    }

    years
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// Students per declared major, largest first, ties by major ascending.
/// Undeclared students are left out.
pub fn students_by_major(snapshot: &RecordSnapshot) -> Vec<MajorCount> {
    let majors = count_by(snapshot.students().filter_map(|s| s.major.as_deref()));
    majors
        .into_iter()
        .map(|(major, count)| MajorCount { major, count })
        .collect()
}

/// Students per recorded gender, largest first, ties by gender ascending.
pub fn students_by_gender(snapshot: &RecordSnapshot) -> Vec<GenderCount> {
    let genders = count_by(snapshot.students().map(|s| s.gender.as_str()));
    genders
        .into_iter()
        .map(|(gender, count)| GenderCount { gender, count })
        .collect()
}

/// Mean GPA per major over students that have both a major and a GPA.
pub fn average_gpa_by_major(snapshot: &RecordSnapshot) -> Vec<MajorGpa> {
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for student in snapshot.students() {
        if let (Some(major), Some(gpa)) = (student.major.as_deref(), student.gpa) {
            let entry = totals.entry(major).or_default();
            entry.0 += gpa;
            entry.1 += 1;
        }
    }

    let mut rows: Vec<MajorGpa> = totals
        .into_iter()
        .map(|(major, (sum, count))| MajorGpa {
            major: major.to_string(),
            average_gpa: round2(sum / count as f64),
            student_count: count,
        })
        .collect();

    // BTreeMap iteration already has majors ascending; the stable sort keeps that for ties.
    rows.sort_by(|a, b| b.average_gpa.total_cmp(&a.average_gpa));
    rows
}

/// Counts occurrences per label, largest group first, ties by label ascending.
fn count_by<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }

    let mut rows: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{RecordSet, Student, StudentId};
    use chrono::NaiveDate;

    fn student(id: u32, year: i32, major: Option<&str>, gender: &str, gpa: Option<f64>) -> Student {
        Student {
            id: StudentId(id),
            enrollment_date: NaiveDate::from_ymd_opt(year, 8, 20).expect("valid date"),
            major: major.map(str::to_string),
            gender: gender.to_string(),
            gpa,
        }
    }

    fn snapshot(students: Vec<Student>) -> RecordSnapshot {
        RecordSnapshot::build(RecordSet {
            students,
            ..RecordSet::default()
        })
        .expect("snapshot builds")
    }

    #[test]
    fn enrollment_years_ascend() {
        let snapshot = snapshot(vec![
            student(1, 2021, None, "Male", None),
            student(2, 2019, None, "Male", None),
            student(3, 2021, None, "Female", None),
        ]);

        assert_eq!(
            students_by_enrollment_year(&snapshot),
            vec![
                YearCount {
                    year: 2019,
                    count: 1
                },
                YearCount {
                    year: 2021,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn majors_skip_undeclared_and_break_ties_by_name() {
        let snapshot = snapshot(vec![
            student(1, 2020, Some("Music"), "Male", None),
            student(2, 2020, None, "Male", None),
            student(3, 2020, Some("Art"), "Female", None),
            student(4, 2020, Some("History"), "Female", None),
            student(5, 2020, Some("History"), "Male", None),
        ]);

        let rows = students_by_major(&snapshot);
        let labels: Vec<(&str, usize)> = rows.iter().map(|r| (r.major.as_str(), r.count)).collect();
        assert_eq!(labels, vec![("History", 2), ("Art", 1), ("Music", 1)]);
        assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), 4);
    }

    #[test]
    fn genders_count_every_student() {
        let snapshot = snapshot(vec![
            student(1, 2020, None, "Non-binary", None),
            student(2, 2020, None, "Female", None),
            student(3, 2020, None, "Female", None),
        ]);

        let rows = students_by_gender(&snapshot);
        assert_eq!(rows[0].gender, "Female");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), 3);
    }

    #[test]
    fn gender_ties_order_by_label() {
        let snapshot = snapshot(vec![
            student(1, 2020, None, "Male", None),
            student(2, 2020, None, "Non-binary", None),
            student(3, 2020, None, "Female", None),
            student(4, 2020, None, "Female", None),
        ]);

        let genders: Vec<String> = students_by_gender(&snapshot)
            .into_iter()
            .map(|r| r.gender)
            .collect();
        assert_eq!(genders, vec!["Female", "Male", "Non-binary"]);
    }

    #[test]
    fn average_gpa_requires_major_and_gpa() {
        let snapshot = snapshot(vec![
            student(1, 2020, Some("CS"), "Male", Some(3.0)),
            student(2, 2020, Some("CS"), "Female", Some(4.0)),
            student(3, 2020, Some("Math"), "Female", Some(2.0)),
            student(4, 2020, Some("Math"), "Male", None),
            student(5, 2020, None, "Male", Some(1.0)),
        ]);

        assert_eq!(
            average_gpa_by_major(&snapshot),
            vec![
                MajorGpa {
                    major: "CS".to_string(),
                    average_gpa: 3.5,
                    student_count: 2
                },
                MajorGpa {
                    major: "Math".to_string(),
                    average_gpa: 2.0,
                    student_count: 1
                },
            ]
        );
    }

    #[test]
    fn average_gpa_rounds_to_two_places() {
        let snapshot = snapshot(vec![
            student(1, 2020, Some("Physics"), "Male", Some(3.0)),
            student(2, 2020, Some("Physics"), "Male", Some(3.0)),
            student(3, 2020, Some("Physics"), "Male", Some(3.5)),
        ]);

        assert_eq!(average_gpa_by_major(&snapshot)[0].average_gpa, 3.17);
    }

    #[test]
    fn empty_snapshot_yields_empty_reports() {
        let snapshot = snapshot(Vec::new());
        assert!(students_by_enrollment_year(&snapshot).is_empty());
        assert!(students_by_major(&snapshot).is_empty());
        assert!(students_by_gender(&snapshot).is_empty());
        assert!(average_gpa_by_major(&snapshot).is_empty());
    }
}
