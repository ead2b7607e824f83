//! FairGroup partitioner — size-balanced groups with close averages.
//!
//! Takes a roster of graded individuals and a group count and produces
//! groups whose sizes differ by at most one and whose averages are
//! brought together by a bounded local search. Transport concerns
//! (HTTP, CSV) live in `fairgroup-api`.
//!
//! # Components
//!
//! - **`roster`** — Deduplicated roster with deterministic ordering
//! - **`partitioner`** — Round-robin draw into size-balanced groups
//! - **`balancer`** — Divide-and-conquer pairwise swap search
//! - **`aggregate`** — Group averages and summaries
//! - **`pipeline`** — The full assignment in one call

pub mod aggregate;
pub mod balancer;
pub mod error;
pub mod partitioner;
pub mod pipeline;
pub mod roster;

pub use fairgroup_core::{GradeRange, GradeRecord, GroupSummary, Individual};

pub use aggregate::{average, spread, summarize};
pub use balancer::{BalanceReport, Balancer, DEFAULT_MAX_ROUNDS, Swap, improve_by_swapping};
pub use error::{PartitionError, PartitionResult};
pub use partitioner::{Group, Partition, group_sizes, partition};
pub use pipeline::{Assignment, assign};
pub use roster::{AddOutcome, AddSummary, RejectReason, Roster, roster_order};
