//! Round-robin partitioner.
//!
//! Splits a roster-ordered sequence into `k` groups whose sizes differ by
//! at most one. Groups are filled by cycling over the group indices and
//! drawing from the front of the sequence, so each group starts out in
//! roster order (grade descending).

use std::collections::VecDeque;

use fairgroup_core::Individual;
use tracing::debug;

use crate::aggregate;
use crate::error::{PartitionError, PartitionResult};
use crate::roster::roster_order;

/// An ordered group of individuals, kept in roster order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub(crate) members: Vec<Individual>,
}

impl Group {
    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sum of member grades in tenths.
    pub fn sum_tenths(&self) -> i128 {
        self.members.iter().map(Individual::tenths).sum()
    }

    pub fn average(&self) -> f64 {
        aggregate::average(&self.members)
    }

    /// Insert at the position that keeps the group in roster order.
    pub(crate) fn insert_sorted(&mut self, individual: Individual) {
        let pos = self
            .members
            .partition_point(|m| roster_order(m, &individual).is_lt());
        self.members.insert(pos, individual);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Individual {
        self.members.remove(index)
    }
}

/// `k` groups covering a roster exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub groups: Vec<Group>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.groups.iter().map(Group::len).collect()
    }

    /// Total number of individuals across all groups.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }
}

/// Target size of every group: the first `n % k` groups take one extra.
pub fn group_sizes(n: usize, k: usize) -> Vec<usize> {
    let base = n / k;
    let remainder = n % k;
    (0..k).map(|i| base + usize::from(i < remainder)).collect()
}

/// Partition a roster-ordered sequence into `k` size-balanced groups.
pub fn partition(snapshot: Vec<Individual>, k: usize) -> PartitionResult<Partition> {
    let n = snapshot.len();
    if k == 0 || k > n {
        return Err(PartitionError::InvalidGroupCount {
            requested: i64::try_from(k).unwrap_or(i64::MAX),
            available: n,
        });
    }

    let targets = group_sizes(n, k);
    let mut groups: Vec<Group> = targets
        .iter()
        .map(|&size| Group {
            members: Vec::with_capacity(size),
        })
        .collect();

    let mut remaining: VecDeque<Individual> = snapshot.into();
    while !remaining.is_empty() {
        for (group, &target) in groups.iter_mut().zip(&targets) {
            if group.len() >= target {
                continue;
            }
            if let Some(next) = remaining.pop_front() {
                group.members.push(next);
            }
        }
    }

    // The swap search relies on roster order inside each group.
    for group in &mut groups {
        group.members.sort_by(roster_order);
    }

    debug!(individuals = n, groups = k, sizes = ?targets, "round-robin draw complete");

    Ok(Partition { groups })
}
