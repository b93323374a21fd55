//! Derived grouping keys and numeric helpers shared by the reports.

use crate::records::Semester;
use serde::Serialize;
use std::fmt;

/// Letter grade bucket. Variant order is the display order A..F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GradeLetter {
    A,
    B,
    C,
    D,
    F,
}

impl GradeLetter {
    pub const fn ordered() -> [Self; 5] {
        [Self::A, Self::B, Self::C, Self::D, Self::F]
    }

    /// Lower bounds are inclusive: 90 is an A, 89.9 is a B.
    pub fn from_grade(grade: f64) -> Self {
        if grade >= 90.0 {
            Self::A
        } else if grade >= 80.0 {
            Self::B
        } else if grade >= 70.0 {
            Self::C
        } else if grade >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for GradeLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A (semester, year) pair ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Term {
    pub semester: Semester,
    pub year: i32,
}

impl Term {
    pub const fn new(semester: Semester, year: i32) -> Self {
        Self { semester, year }
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| self.semester.rank().cmp(&other.semester.rank()))
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.semester, self.year)
    }
}

/// A grade of 60 or more on a completed enrollment counts as a pass.
pub const PASSING_GRADE: f64 = 60.0;

/// Rounds half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
