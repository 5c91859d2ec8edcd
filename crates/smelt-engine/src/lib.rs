//! Time-stepping orchestration for the smelt heat solver.
//!
//! [`Layer`] drives one simulated layer: per step it advances the beam,
//! snapshots the temperature into the previous-step buffer, runs the
//! FTCS kernel, re-establishes the ghost layer (boundaries, then
//! halos), and feeds the field pair to the solidification recorder.
//! Snapshots and monitor records are emitted on their configured
//! intervals, with a forced terminal emission.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod layer;
pub mod monitor;

pub use error::EngineError;
pub use layer::{Layer, LayerStats};
pub use monitor::{Monitor, MonitorRecord};
