//! The per-step update kernel.

use rayon::prelude::*;

use smelt_core::Vec3;
use smelt_grid::LocalGrid;

use crate::params::StepParams;

/// Forward-time centered-space solver with apparent heat capacity.
#[derive(Clone, Copy, Debug)]
pub struct FtcsSolver {
    params: StepParams,
}

impl FtcsSolver {
    /// Wrap the precomputed constants.
    pub fn new(params: StepParams) -> Self {
        Self { params }
    }

    /// The kernel constants.
    pub fn params(&self) -> &StepParams {
        &self.params
    }

    /// Advance every owned cell of `grid` by one step.
    ///
    /// Reads the previous-step field (interior and ghosts — the caller
    /// must have applied boundaries and gathered halos before the
    /// snapshot was taken) and writes only the current field's owned
    /// cells. Rows of the lattice are independent, so the loop runs
    /// parallel over x-contiguous rows.
    pub fn step(&self, grid: &mut LocalGrid, beam_position: Vec3, beam_power: f64) {
        let p = self.params;
        // Center of the first owned cell; row coordinates derive from it.
        let origin = grid.local_coordinates(1, 1, 1);
        let (temperature, previous) = grid.fields_mut();
        let dims = temperature.dims();
        let (nx, ny, nz) = (dims[0], dims[1], dims[2]);
        let t0 = previous.as_slice();
        let powered = beam_power > 0.0;
        let h = p.cell_size;

        temperature
            .as_mut_slice()
            .par_chunks_exact_mut(nx)
            .enumerate()
            .for_each(|(r, row)| {
                let (j, k) = (r % ny, r / ny);
                if j == 0 || j == ny - 1 || k == 0 || k == nz - 1 {
                    return;
                }
                let y = origin[1] + (j - 1) as f64 * h;
                let z = origin[2] + (k - 1) as f64 * h;
                let wy = p.radius_inv_sq[1] * (y - beam_position[1]) * (y - beam_position[1]);
                let wz = p.radius_inv_sq[2] * (z - beam_position[2]) * (z - beam_position[2]);
                let base = r * nx;

                for i in 1..nx - 1 {
                    let idx = base + i;
                    let x = t0[idx];

                    // Apparent heat capacity: the latent term switches on
                    // inside the mushy interval. Branchless so the row
                    // vectorizes.
                    let mushy = f64::from(x >= p.solidus && x <= p.liquidus);
                    let c_eff = p.rho_cp + mushy * p.latent_factor;

                    let laplacian = p.k_over_h2
                        * (t0[idx - 1]
                            + t0[idx + 1]
                            + t0[idx - nx]
                            + t0[idx + nx]
                            + t0[idx - nx * ny]
                            + t0[idx + nx * ny]
                            - 6.0 * x);

                    let mut source = 0.0;
                    if powered {
                        let xc = origin[0] + (i - 1) as f64 * h;
                        let wx =
                            p.radius_inv_sq[0] * (xc - beam_position[0]) * (xc - beam_position[0]);
                        let w = wx + wy + wz;
                        if w < p.source_cutoff {
                            source = p.peak_intensity * beam_power * (-w).exp();
                        }
                    }

                    row[i] = x + (p.dt / c_eff) * (laplacian + source);
                }
            });
    }
}
