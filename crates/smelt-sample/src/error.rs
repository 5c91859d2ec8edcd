//! Sampler error types.

use std::error::Error;
use std::fmt;

use smelt_comm::CommError;

/// Errors from event reductions and CSV emission.
#[derive(Debug)]
pub enum SampleError {
    /// A bounding-box reduction failed; fatal like any collective.
    Reduce(CommError),
    /// Writing the event CSV failed.
    Io(std::io::Error),
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reduce(e) => write!(f, "event reduction failed: {e}"),
            Self::Io(e) => write!(f, "event output failed: {e}"),
        }
    }
}

impl Error for SampleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Reduce(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}
