//! Roster — deduplicated, deterministically ordered set of individuals.
//!
//! Records are held in a map keyed by name; the ordered view (grade
//! descending, name ascending) is materialized on demand by
//! [`Roster::snapshot`].

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use fairgroup_core::{GradeRange, GradeRecord, Individual};
use serde::Serialize;
use tracing::{debug, warn};

/// Roster order: higher grade first, then name ascending.
pub fn roster_order(a: &Individual, b: &Individual) -> Ordering {
    b.tenths()
        .cmp(&a.tenths())
        .then_with(|| a.name.cmp(&b.name))
}

/// Why a record was not admitted.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    EmptyName,
    GradeOutOfRange { grade: f64 },
}

/// Result of a single [`Roster::add`].
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Inserted,
    /// Name already present; the first record is kept.
    Duplicate,
    Rejected(RejectReason),
}

/// Tally of a batch insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddSummary {
    pub inserted: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

impl AddSummary {
    fn record(&mut self, outcome: &AddOutcome) {
        match outcome {
            AddOutcome::Inserted => self.inserted += 1,
            AddOutcome::Duplicate => self.duplicates += 1,
            AddOutcome::Rejected(_) => self.rejected += 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    members: HashMap<String, Individual>,
    range: GradeRange,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(range: GradeRange) -> Self {
        Self {
            members: HashMap::new(),
            range,
        }
    }

    pub fn range(&self) -> GradeRange {
        self.range
    }

    fn reject_grade(&self, name: &str, grade: f64) -> AddOutcome {
        warn!(
            name = %name,
            grade,
            min = self.range.min,
            max = self.range.max,
            "skipping record with invalid grade"
        );
        AddOutcome::Rejected(RejectReason::GradeOutOfRange { grade })
    }

    /// Insert an individual. Out-of-range grades and blank names are
    /// skipped with a warning; a repeated name keeps the first record.
    pub fn add(&mut self, individual: Individual) -> AddOutcome {
        if individual.name.trim().is_empty() {
            warn!("skipping record with empty name");
            return AddOutcome::Rejected(RejectReason::EmptyName);
        }
        if !self.range.contains(individual.grade) {
            return self.reject_grade(&individual.name, individual.grade);
        }
        if self.members.contains_key(&individual.name) {
            debug!(name = %individual.name, "duplicate name ignored");
            return AddOutcome::Duplicate;
        }
        self.members.insert(individual.name.clone(), individual);
        AddOutcome::Inserted
    }

    /// Insert a client record. The range check runs on the grade as
    /// submitted, before it is rounded, so `0.96` stays out of `[1, 5]`.
    pub fn add_record(&mut self, record: GradeRecord) -> AddOutcome {
        if !record.name.trim().is_empty() && !self.range.contains(record.grade) {
            return self.reject_grade(&record.name, record.grade);
        }
        self.add(record.into())
    }

    pub fn extend_records<I>(&mut self, records: I) -> AddSummary
    where
        I: IntoIterator<Item = GradeRecord>,
    {
        let mut summary = AddSummary::default();
        for record in records {
            let outcome = self.add_record(record);
            summary.record(&outcome);
        }
        summary
    }

    pub fn extend<I>(&mut self, records: I) -> AddSummary
    where
        I: IntoIterator<Item = Individual>,
    {
        let mut summary = AddSummary::default();
        for record in records {
            let outcome = self.add(record);
            summary.record(&outcome);
        }
        summary
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Individual> {
        self.members.get(name)
    }

    /// Members in roster order. The returned vector is detached from
    /// the roster, so later adds do not affect it.
    pub fn snapshot(&self) -> Vec<Individual> {
        let mut ordered: Vec<Individual> = self.members.values().cloned().collect();
        ordered.sort_by(roster_order);
        ordered
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}

impl fmt::Display for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for member in self.snapshot() {
            writeln!(f, "{} ({:.1})", member.name, member.grade)?;
        }
        Ok(())
    }
}
