//! Distributed structured grid for the smelt heat solver.
//!
//! A [`LocalGrid`] owns one Cartesian block of the global lattice: the
//! current and previous temperature fields with a one-cell ghost layer,
//! the per-face boundary conditions, and the halo-exchange plumbing
//! that keeps ghost cells coherent with neighboring ranks.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod error;
pub mod field;
pub mod grid;
pub mod partition;
pub mod snapshot;
pub mod spec;

pub use boundary::{BoundaryKind, BoundarySet, FaceCondition, FACE_NAMES};
pub use error::GridError;
pub use field::ScalarField3;
pub use grid::LocalGrid;
pub use partition::BlockPartition;
pub use snapshot::{snapshot_path, write_snapshot};
pub use spec::GridSpec;
