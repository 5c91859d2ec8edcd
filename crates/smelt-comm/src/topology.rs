//! Cartesian rank topology and the automatic partitioner.

use crate::error::CommError;

/// Placement of one rank in a 3D Cartesian process grid.
///
/// Ranks are laid out x-fastest: `rank = cx + dims_x·(cy + dims_y·cz)`,
/// matching the x-fastest storage of the temperature fields. The
/// topology is non-periodic; faces on the edge of the process grid have
/// no neighbor and are handled by physical boundary conditions instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CartesianTopology {
    /// This rank.
    pub rank: usize,
    /// Total ranks (`dims[0]·dims[1]·dims[2]`).
    pub size: usize,
    /// Process-grid extent per axis.
    pub dims: [usize; 3],
    /// This rank's coordinates in the process grid.
    pub coords: [usize; 3],
}

impl CartesianTopology {
    /// Place `rank` in a process grid of shape `dims`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the product of `dims` disagrees with `size` or
    /// `rank >= size`.
    pub fn new(rank: usize, size: usize, dims: [usize; 3]) -> Result<Self, CommError> {
        if dims[0] * dims[1] * dims[2] != size || dims.contains(&0) {
            return Err(CommError::InvalidTopology {
                reason: format!(
                    "process grid {}x{}x{} does not tile {size} ranks",
                    dims[0], dims[1], dims[2]
                ),
            });
        }
        if rank >= size {
            return Err(CommError::InvalidRank { rank, size });
        }
        let coords = [
            rank % dims[0],
            (rank / dims[0]) % dims[1],
            rank / (dims[0] * dims[1]),
        ];
        Ok(Self {
            rank,
            size,
            dims,
            coords,
        })
    }

    /// Rank at the given process-grid coordinates.
    pub fn rank_of(&self, coords: [usize; 3]) -> usize {
        coords[0] + self.dims[0] * (coords[1] + self.dims[1] * coords[2])
    }

    /// Neighbor rank one step along `axis` in direction `side`
    /// (−1 or +1), or `None` at the edge of the process grid.
    pub fn neighbor(&self, axis: usize, side: i32) -> Option<usize> {
        let c = self.coords[axis] as i64 + side as i64;
        if c < 0 || c >= self.dims[axis] as i64 {
            return None;
        }
        let mut coords = self.coords;
        coords[axis] = c as usize;
        Some(self.rank_of(coords))
    }
}

/// Resolve the process-grid shape for `size` ranks.
///
/// If `requested` has no zero entry, its product equals `size`, and it
/// gives every rank at least one cell per axis, it is used as given.
/// Otherwise a balanced factorization of `size` is substituted: the
/// most-balanced factor triple, with larger factors assigned to axes
/// with more cells. The second return value is `true` when the
/// fallback was taken, so callers can log the recovery.
///
/// # Errors
///
/// Returns `Err` only when no factorization at all gives every rank at
/// least one cell on every axis (more ranks than the lattice can seat).
pub fn resolve_dims(
    size: usize,
    requested: [usize; 3],
    global_cells: [usize; 3],
) -> Result<([usize; 3], bool), CommError> {
    let feasible = |dims: &[usize; 3]| (0..3).all(|d| dims[d] <= global_cells[d]);

    if !requested.contains(&0)
        && requested[0] * requested[1] * requested[2] == size
        && feasible(&requested)
    {
        return Ok((requested, false));
    }

    // All factor triples a <= b <= c of `size`, most balanced first.
    let mut triples = Vec::new();
    let mut a = 1;
    while a * a * a <= size {
        if size % a == 0 {
            let rest = size / a;
            let mut b = a;
            while b * b <= rest {
                if rest % b == 0 {
                    triples.push([a, b, rest / b]);
                }
                b += 1;
            }
        }
        a += 1;
    }
    triples.sort_by_key(|t| (t[2] - t[0], t[2]));

    // Axis order by cell count, descending; ties keep axis order.
    let mut axis_order = [0usize, 1, 2];
    axis_order.sort_by_key(|&d| std::cmp::Reverse(global_cells[d]));

    for triple in &triples {
        let mut dims = [0usize; 3];
        // Largest factor to the axis with the most cells.
        dims[axis_order[0]] = triple[2];
        dims[axis_order[1]] = triple[1];
        dims[axis_order[2]] = triple[0];
        if feasible(&dims) {
            return Ok((dims, true));
        }
    }

    Err(CommError::InvalidTopology {
        reason: format!(
            "no factorization of {size} ranks fits cell extents {}x{}x{}",
            global_cells[0], global_cells[1], global_cells[2]
        ),
    })
}
