//! Solidification event recording for the smelt heat solver.
//!
//! [`SolidificationData`] watches the temperature field for liquidus
//! crossings. An upward crossing stamps the cell's melt time; a
//! downward crossing appends one event row carrying the cell position,
//! melt and resolidification times, cooling rate, and the local
//! temperature gradient — the quantities downstream microstructure
//! models consume. Appends use a lock-free atomic-counter protocol so
//! the scan parallelizes over cells, with capacity regrow-and-retry on
//! overflow.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod csv;
pub mod error;
pub mod recorder;

pub use csv::{csv_path, write_events_csv};
pub use error::SampleError;
pub use recorder::{SolidificationData, EVENT_WIDTH};
