//! Ghosted scalar field storage.

use smelt_core::IndexSpace;

/// A scalar-per-cell field on a 3D block, padded with one ghost layer
/// on every face.
///
/// Storage is x-fastest: `index(i, j, k) = i + nx·(j + ny·k)` where
/// `(nx, ny, nz)` are the padded dimensions. Index 0 on each axis is
/// the low ghost layer; `dims[d] - 1` is the high ghost layer; owned
/// interior cells live in `[1, dims[d] - 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarField3 {
    data: Vec<f64>,
    dims: [usize; 3],
}

impl ScalarField3 {
    /// Allocate a field for the given interior extents, ghost layers
    /// included, every cell (ghosts too) set to `fill`.
    pub fn with_ghosts(interior: [usize; 3], fill: f64) -> Self {
        let dims = [interior[0] + 2, interior[1] + 2, interior[2] + 2];
        Self {
            data: vec![fill; dims[0] * dims[1] * dims[2]],
            dims,
        }
    }

    /// Padded dimensions, ghost layers included.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// The owned interior as a half-open index range.
    pub fn interior(&self) -> IndexSpace {
        IndexSpace::new(
            [1, 1, 1],
            [self.dims[0] - 1, self.dims[1] - 1, self.dims[2] - 1],
        )
    }

    /// Flat index of `(i, j, k)` in the padded array.
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.dims[0] && j < self.dims[1] && k < self.dims[2]);
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    /// Value at `(i, j, k)`.
    #[inline]
    pub fn at(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.index(i, j, k)]
    }

    /// Mutable access to the value at `(i, j, k)`.
    #[inline]
    pub fn at_mut(&mut self, i: usize, j: usize, k: usize) -> &mut f64 {
        let idx = self.index(i, j, k);
        &mut self.data[idx]
    }

    /// The whole padded array, x fastest.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable view of the whole padded array, x fastest.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Overwrite every cell (ghosts included) from `other`.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ; current and previous fields are
    /// allocated together and never change shape.
    pub fn copy_from(&mut self, other: &ScalarField3) {
        assert_eq!(self.dims, other.dims, "field shape mismatch");
        self.data.copy_from_slice(&other.data);
    }

    /// Set every cell, ghosts included, to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Copy the interior values (no ghosts) into a dense x-fastest
    /// vector, the shape snapshot writers consume.
    pub fn interior_values(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.interior().cell_count());
        for (i, j, k) in self.interior().iter() {
            out.push(self.at(i, j, k));
        }
        out
    }

    /// Sum of `|value|` over the interior. Used by conservation tests
    /// and sanity monitors.
    pub fn interior_l1_norm(&self) -> f64 {
        self.interior().iter().map(|(i, j, k)| self.at(i, j, k).abs()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_include_ghosts() {
        let f = ScalarField3::with_ghosts([4, 3, 2], 0.0);
        assert_eq!(f.dims(), [6, 5, 4]);
        assert_eq!(f.as_slice().len(), 6 * 5 * 4);
        assert_eq!(f.interior().cell_count(), 24);
    }

    #[test]
    fn index_is_x_fastest() {
        let f = ScalarField3::with_ghosts([2, 2, 2], 0.0);
        assert_eq!(f.index(0, 0, 0), 0);
        assert_eq!(f.index(1, 0, 0), 1);
        assert_eq!(f.index(0, 1, 0), 4);
        assert_eq!(f.index(0, 0, 1), 16);
    }

    #[test]
    fn interior_values_skip_ghosts() {
        let mut f = ScalarField3::with_ghosts([2, 1, 1], -1.0);
        *f.at_mut(1, 1, 1) = 3.0;
        *f.at_mut(2, 1, 1) = 4.0;
        assert_eq!(f.interior_values(), vec![3.0, 4.0]);
        assert_eq!(f.interior_l1_norm(), 7.0);
    }

    #[test]
    fn copy_from_includes_ghosts() {
        let mut a = ScalarField3::with_ghosts([2, 2, 2], 1.0);
        let b = ScalarField3::with_ghosts([2, 2, 2], 9.0);
        a.copy_from(&b);
        assert_eq!(a.at(0, 0, 0), 9.0);
        assert_eq!(a.at(3, 3, 3), 9.0);
    }
}
