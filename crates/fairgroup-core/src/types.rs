//! Shared types used across FairGroup crates.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Round a value to one decimal place, half away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A graded individual. Identity is the name; the grade does not take
/// part in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
    pub name: String,
    pub grade: f64,
}

impl Individual {
    /// Build an individual, rounding the grade to one decimal place.
    pub fn new(name: impl Into<String>, grade: f64) -> Self {
        Self {
            name: name.into(),
            grade: round_to_tenth(grade),
        }
    }

    /// Grade expressed in integer tenths (`4.3` → `43`).
    ///
    /// Exact for any grade built through [`Individual::new`]. Sums and
    /// cross-products of tenths are taken in `i128` by the balancer.
    pub fn tenths(&self) -> i128 {
        (self.grade * 10.0).round() as i128
    }
}

impl PartialEq for Individual {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Individual {}

impl Hash for Individual {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// A `{name, grade}` record as submitted by clients, before validation.
/// The grade is kept exactly as given until the roster admits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub name: String,
    pub grade: f64,
}

impl GradeRecord {
    pub fn new(name: impl Into<String>, grade: f64) -> Self {
        Self {
            name: name.into(),
            grade,
        }
    }
}

impl From<GradeRecord> for Individual {
    fn from(record: GradeRecord) -> Self {
        Individual::new(record.name, record.grade)
    }
}

/// Inclusive range of accepted grades.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeRange {
    pub min: f64,
    pub max: f64,
}

impl GradeRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Non-finite grades are never contained.
    pub fn contains(&self, grade: f64) -> bool {
        grade.is_finite() && grade >= self.min && grade <= self.max
    }
}

impl Default for GradeRange {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

/// One group of a finished assignment, as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// 1-based position of the group.
    pub group_number: usize,
    /// Group average rounded to one decimal place.
    pub average_grade: f64,
    pub students: Vec<Individual>,
}
