//! Engine error types.

use std::error::Error;
use std::fmt;

use smelt_grid::GridError;
use smelt_sample::SampleError;

/// Errors surfacing from a layer run. All are fatal; the loop does not
/// continue past a failed collective or a failed emission.
#[derive(Debug)]
pub enum EngineError {
    /// Halo exchange, boundary machinery, or snapshot output failed.
    Grid(GridError),
    /// Event recording or reduction failed.
    Sample(SampleError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "{e}"),
            Self::Sample(e) => write!(f, "{e}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Sample(e) => Some(e),
        }
    }
}

impl From<GridError> for EngineError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<SampleError> for EngineError {
    fn from(e: SampleError) -> Self {
        Self::Sample(e)
    }
}
