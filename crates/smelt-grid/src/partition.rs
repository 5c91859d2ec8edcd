//! Block decomposition of the global lattice.

/// The axis-aligned block of global cells owned by one rank.
///
/// Cells along each axis are split as evenly as possible across the
/// process grid: with `n = base·p + rem`, the first `rem` ranks get
/// `base + 1` cells. Blocks tile the lattice exactly and every block is
/// non-empty whenever the process grid fits the cell extents (which
/// [`smelt_comm::resolve_dims`] guarantees).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockPartition {
    /// Global index of this block's first cell, per axis.
    pub offset: [usize; 3],
    /// Owned cell counts per axis.
    pub cells: [usize; 3],
}

impl BlockPartition {
    /// Compute the block for the rank at `coords` in a process grid of
    /// shape `dims` over `global_cells`.
    pub fn new(dims: [usize; 3], coords: [usize; 3], global_cells: [usize; 3]) -> Self {
        let mut offset = [0usize; 3];
        let mut cells = [0usize; 3];
        for d in 0..3 {
            let (n, p, c) = (global_cells[d], dims[d], coords[d]);
            let base = n / p;
            let rem = n % p;
            cells[d] = base + usize::from(c < rem);
            offset[d] = c * base + c.min(rem);
        }
        Self { offset, cells }
    }

    /// Owned cell count of the block.
    pub fn cell_count(&self) -> usize {
        self.cells[0] * self.cells[1] * self.cells[2]
    }
}
