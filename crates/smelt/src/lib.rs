//! Smelt: transient heat conduction under a moving beam, with
//! solidification event sampling for microstructure prediction.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all smelt sub-crates. For most users, adding `smelt` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use smelt::prelude::*;
//!
//! // A 10x10x10 unit block with adiabatic walls.
//! let spec = GridSpec::new(1.0, [0.0; 3], [10.0; 3]).unwrap();
//! let mut grid =
//!     LocalGrid::new(&SoloComm, spec, [0; 3], BoundarySet::adiabatic(), 300.0).unwrap();
//!
//! // Unit-diffusivity material, symmetric source.
//! let props = MaterialProperties::new(1.0, 1.0, 1.0, 0.0, 1e6, 2e6).unwrap();
//! let source = SourceShape::new(1.0, [1.0; 3]).unwrap();
//! let solver = FtcsSolver::new(StepParams::new(&props, &source, 1.0, 0.1));
//!
//! // One dark step leaves the uniform field untouched.
//! grid.update_boundaries();
//! grid.store_previous();
//! solver.step(&mut grid, [5.0; 3], 0.0);
//! assert_eq!(grid.temperature().at(5, 5, 5), 300.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `smelt-core` | Configuration, material/source parameters, index spaces |
//! | [`comm`] | `smelt-comm` | Communicator trait, Cartesian topology, rank backends |
//! | [`grid`] | `smelt-grid` | Ghosted fields, boundaries, halo exchange, snapshots |
//! | [`path`] | `smelt-path` | Scan path loading and beam queries |
//! | [`solver`] | `smelt-solver` | The FTCS update kernel |
//! | [`sample`] | `smelt-sample` | Solidification event recording and CSV output |
//! | [`engine`] | `smelt-engine` | The layer loop and monitor |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Configuration schema, material and source parameters, index spaces
/// (`smelt-core`).
pub use smelt_core as types;

/// Rank communication: the [`comm::Communicator`] trait with solo and
/// thread-backed implementations, plus the Cartesian topology
/// (`smelt-comm`).
pub use smelt_comm as comm;

/// The distributed grid: ghosted temperature fields, per-face boundary
/// conditions, halo exchange, and snapshot output (`smelt-grid`).
pub use smelt_grid as grid;

/// Scan path loading and time-parameterized beam queries
/// (`smelt-path`).
pub use smelt_path as path;

/// The FTCS update kernel with latent heat and the Gaussian source
/// (`smelt-solver`).
pub use smelt_solver as solver;

/// Solidification event detection, the lock-free event log, and CSV
/// emission (`smelt-sample`).
pub use smelt_sample as sample;

/// Layer orchestration: the step loop and wall-clock monitor
/// (`smelt-engine`).
pub use smelt_engine as engine;

/// Common imports for typical smelt usage.
///
/// ```rust
/// use smelt::prelude::*;
/// ```
pub mod prelude {
    pub use smelt_comm::{Communicator, LocalComm, SoloComm};
    pub use smelt_core::{
        Input, MaterialProperties, SourceShape, TimeControl, Vec3,
    };
    pub use smelt_engine::{Layer, LayerStats, Monitor};
    pub use smelt_grid::{BoundaryKind, BoundarySet, FaceCondition, GridSpec, LocalGrid};
    pub use smelt_path::{Beam, ScanPath};
    pub use smelt_sample::SolidificationData;
    pub use smelt_solver::{FtcsSolver, StepParams};
}
