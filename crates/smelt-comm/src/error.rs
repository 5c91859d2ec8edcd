//! Communication error types.

use std::error::Error;
use std::fmt;

/// Errors from rank-to-rank communication.
///
/// All collective failures are fatal: no retry is defined, and the
/// caller aborts the run with the diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommError {
    /// A peer rank index is outside `[0, size)`.
    InvalidRank {
        /// The offending rank.
        rank: usize,
        /// Communicator size.
        size: usize,
    },
    /// A collective did not complete: a peer disconnected, a receive
    /// timed out, or a payload had the wrong shape.
    CollectiveFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The process grid cannot be formed: dimensions do not tile the
    /// rank count, or no factorization fits the cell extents.
    InvalidTopology {
        /// Human-readable description of the mismatch.
        reason: String,
    },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRank { rank, size } => {
                write!(f, "rank {rank} out of range for communicator of size {size}")
            }
            Self::CollectiveFailed { reason } => write!(f, "collective failed: {reason}"),
            Self::InvalidTopology { reason } => write!(f, "invalid topology: {reason}"),
        }
    }
}

impl Error for CommError {}
