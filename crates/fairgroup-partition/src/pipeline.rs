//! End-to-end assignment: snapshot → partition → balance → summarize.

use fairgroup_core::GroupSummary;
use serde::Serialize;
use tracing::info;

use crate::aggregate::{spread, summarize};
use crate::balancer::Balancer;
use crate::error::PartitionResult;
use crate::partitioner::partition;
use crate::roster::Roster;

/// Finished assignment for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub groups: Vec<GroupSummary>,
    /// Number of swaps the balancer performed.
    pub swaps: usize,
}

/// Split the roster into `group_count` balanced groups.
pub fn assign(
    roster: &Roster,
    group_count: usize,
    balancer: &Balancer,
) -> PartitionResult<Assignment> {
    let mut partition = partition(roster.snapshot(), group_count)?;
    let initial_spread = spread(&partition);

    let report = balancer.balance(&mut partition);

    info!(
        individuals = roster.len(),
        groups = group_count,
        swaps = report.swaps.len(),
        capped_ranges = report.capped_ranges,
        initial_spread,
        final_spread = spread(&partition),
        "groups assigned"
    );

    Ok(Assignment {
        groups: summarize(&partition),
        swaps: report.swaps.len(),
    })
}
