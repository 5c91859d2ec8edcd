//! The [`Communicator`] trait.

use crate::error::CommError;

/// Point-to-point and collective operations over a set of SPMD ranks.
///
/// # Object safety
///
/// The trait is used as `&dyn Communicator` by the grid and sampler so
/// a single code path serves solo, threaded, and (eventually) networked
/// backends.
///
/// # Matching discipline
///
/// The solver is bulk-synchronous: all ranks issue the same sequence of
/// communicator calls in the same order each step. Implementations may
/// rely on this — [`exchange`](Communicator::exchange) calls are matched
/// pairwise by program order, not by tags.
///
/// # Thread safety
///
/// `Send + Sync` so a rank's communicator handle can be borrowed by the
/// rayon worker pool driving that rank's kernels.
pub trait Communicator: Send + Sync {
    /// This rank's index in `[0, size)`.
    fn rank(&self) -> usize;

    /// Number of ranks.
    fn size(&self) -> usize;

    /// Paired slab exchange: send `data` to `dest` (if any) and receive
    /// the matching slab from `src` (if any).
    ///
    /// `None` endpoints model faces on the edge of the process grid: a
    /// rank there sends or receives on one side only, while its
    /// interior peers run the full exchange. Returns `Ok(None)` when
    /// `src` is `None`. Endpoints may equal `self.rank()`; a
    /// self-exchange returns the sent data. A received payload whose
    /// length differs from `recv_len` is a collective failure.
    fn exchange(
        &self,
        dest: Option<usize>,
        src: Option<usize>,
        data: &[f64],
        recv_len: usize,
    ) -> Result<Option<Vec<f64>>, CommError>;

    /// Element-wise minimum across all ranks. Every rank receives the
    /// reduced vector. All ranks must pass equal-length slices.
    fn all_reduce_min(&self, local: &[f64]) -> Result<Vec<f64>, CommError>;

    /// Element-wise maximum across all ranks. Every rank receives the
    /// reduced vector. All ranks must pass equal-length slices.
    fn all_reduce_max(&self, local: &[f64]) -> Result<Vec<f64>, CommError>;

    /// Block until every rank has entered the barrier.
    fn barrier(&self) -> Result<(), CommError>;
}
