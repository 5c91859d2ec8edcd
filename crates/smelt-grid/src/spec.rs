//! Global grid descriptor.

use smelt_core::{ConfigError, Vec3};

/// Immutable description of the global lattice.
///
/// The lattice has `cells[d]` uniform cells of size `cell_size` along
/// axis `d`, spanning `[low_corner[d], low_corner[d] + cells[d]·h)`.
/// The high corner is rounded to the nearest whole cell; configurations
/// whose extents are not close to a multiple of `cell_size` simply get
/// the rounded lattice, matching how the domain is meshed in practice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    /// Uniform cell size `h` in meters.
    pub cell_size: f64,
    /// Physical coordinates of the global low corner.
    pub low_corner: Vec3,
    /// Physical coordinates of the global high corner.
    pub high_corner: Vec3,
    /// Global cell counts per axis.
    pub cells: [usize; 3],
}

impl GridSpec {
    /// Build the descriptor from physical corners and cell size.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `cell_size` is not strictly positive or any
    /// axis spans less than one cell.
    pub fn new(cell_size: f64, low_corner: Vec3, high_corner: Vec3) -> Result<Self, ConfigError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "space.cell_size".into(),
                reason: format!("must be finite and > 0, got {cell_size}"),
            });
        }
        let mut cells = [0usize; 3];
        for d in 0..3 {
            let span = high_corner[d] - low_corner[d];
            let n = (span / cell_size).round();
            if !n.is_finite() || n < 1.0 {
                return Err(ConfigError::Invalid {
                    field: "space.global_high_corner".into(),
                    reason: format!(
                        "axis {d} spans {span} m, less than one cell of {cell_size} m"
                    ),
                });
            }
            cells[d] = n as usize;
        }
        Ok(Self {
            cell_size,
            low_corner,
            high_corner,
            cells,
        })
    }

    /// Total number of cells in the global lattice.
    pub fn total_cells(&self) -> usize {
        self.cells[0] * self.cells[1] * self.cells[2]
    }

    /// Physical center of global cell `(gi, gj, gk)`.
    pub fn cell_center(&self, gi: usize, gj: usize, gk: usize) -> Vec3 {
        let h = self.cell_size;
        [
            self.low_corner[0] + (gi as f64 + 0.5) * h,
            self.low_corner[1] + (gj as f64 + 0.5) * h,
            self.low_corner[2] + (gk as f64 + 0.5) * h,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_counts_round_to_lattice() {
        let spec = GridSpec::new(0.25, [0.0; 3], [1.0, 0.5, 0.26]).unwrap();
        assert_eq!(spec.cells, [4, 2, 1]);
        assert_eq!(spec.total_cells(), 8);
    }

    #[test]
    fn centers_are_offset_half_a_cell() {
        let spec = GridSpec::new(1.0, [10.0, 0.0, 0.0], [20.0, 10.0, 10.0]).unwrap();
        assert_eq!(spec.cell_center(0, 0, 0), [10.5, 0.5, 0.5]);
        assert_eq!(spec.cell_center(9, 0, 0)[0], 19.5);
    }

    #[test]
    fn degenerate_axis_rejected() {
        assert!(GridSpec::new(1.0, [0.0; 3], [5.0, 5.0, 0.2]).is_err());
        assert!(GridSpec::new(0.0, [0.0; 3], [5.0; 3]).is_err());
        assert!(GridSpec::new(1.0, [0.0; 3], [-5.0, 5.0, 5.0]).is_err());
    }
}
