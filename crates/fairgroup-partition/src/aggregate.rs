//! Group averages and result shaping.

use fairgroup_core::{GroupSummary, Individual};

use crate::partitioner::Partition;

/// Mean grade rounded to one decimal place; `0.0` for an empty group.
pub fn average(members: &[Individual]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let sum: i128 = members.iter().map(Individual::tenths).sum();
    (sum as f64 / members.len() as f64).round() / 10.0
}

/// Highest minus lowest rounded group average.
pub fn spread(partition: &Partition) -> f64 {
    let averages = partition.groups.iter().map(|g| g.average());
    let (lo, hi) = averages.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), avg| {
        (lo.min(avg), hi.max(avg))
    });
    if partition.is_empty() {
        0.0
    } else {
        fairgroup_core::round_to_tenth(hi - lo)
    }
}

/// Number the groups from 1 and attach their averages.
pub fn summarize(partition: &Partition) -> Vec<GroupSummary> {
    partition
        .groups
        .iter()
        .enumerate()
        .map(|(i, group)| GroupSummary {
            group_number: i + 1,
            average_grade: group.average(),
            students: group.members().to_vec(),
        })
        .collect()
}
