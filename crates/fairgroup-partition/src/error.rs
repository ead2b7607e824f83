//! Partitioning error types.

use thiserror::Error;

/// Errors that can occur while partitioning a roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("cannot form {requested} groups from {available} individuals (need 1..={available})")]
    InvalidGroupCount { requested: i64, available: usize },
}

pub type PartitionResult<T> = Result<T, PartitionError>;
