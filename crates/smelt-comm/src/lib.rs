//! Rank-to-rank communication for the smelt heat solver.
//!
//! The solver is SPMD: one instance per Cartesian block of the global
//! grid. Everything inter-rank — halo exchange and bounding-box
//! reductions — flows through the object-safe [`Communicator`] trait.
//! Two backends are provided: [`SoloComm`] for single-rank runs and
//! [`LocalComm`], which hosts N ranks on OS threads connected by a full
//! mesh of channels. A message-passing backend over a real interconnect
//! would implement the same trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod comm;
pub mod error;
pub mod local;
pub mod solo;
pub mod topology;

pub use comm::Communicator;
pub use error::CommError;
pub use local::{run_spmd, LocalComm};
pub use solo::SoloComm;
pub use topology::{resolve_dims, CartesianTopology};
