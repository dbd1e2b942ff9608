//! Error types for taskseq operations.

use crate::device::TaskId;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in taskseq operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Element count rejected before any device work is scheduled.
    #[error("'count' must be a positive integer, got '{0}'")]
    InvalidCount(String),

    /// The device reported a fault while executing a submitted command group.
    /// Fatal for the run; there is no retry policy.
    #[error("device fault while executing {task} command group")]
    DeviceFault {
        /// Identifier of the submission that faulted.
        task: TaskId,
    },

    /// `issue` called on a handle that already has work in flight.
    #[error("task sequence issued twice without an intervening collect")]
    AlreadyIssued,

    /// `collect` called on a handle with no work in flight.
    #[error("task sequence collected before issue")]
    NotIssued,
}
