//! Explicit FTCS heat conduction kernel for smelt.
//!
//! One [`FtcsSolver::step`] advances every owned cell of a
//! [`LocalGrid`](smelt_grid::LocalGrid) by one forward-Euler step of
//! the heat equation, with latent heat folded in as an apparent heat
//! capacity over the mushy interval and an anisotropic Gaussian
//! volumetric source following the beam. Cells carry no dependencies on
//! each other within a step (all stencil reads come from the
//! previous-step field), so the kernel runs data-parallel over
//! x-contiguous rows.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod params;
pub mod solver;

pub use params::StepParams;
pub use solver::FtcsSolver;
