//! Beam scan path for the smelt heat solver.
//!
//! A scan path is an ordered list of dwell and traverse segments read
//! from a plain-text file. [`ScanPath`] owns the loaded segments;
//! [`Beam`] answers time queries with the beam's current position and
//! power, caching the active segment index so the monotonic queries of
//! the time loop cost amortized O(1).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod beam;
pub mod error;
pub mod path;
pub mod segment;

pub use beam::Beam;
pub use error::PathError;
pub use path::ScanPath;
pub use segment::{Segment, SegmentKind};

/// Tolerance for time comparisons and the power threshold separating
/// "the beam is on" from trailing zero-power repositioning moves.
pub const EPS: f64 = 1e-10;
