//! Precomputed per-step constants.

use smelt_core::{MaterialProperties, SourceShape};

/// Everything the per-cell kernel needs, folded down to multiplies.
///
/// Derived once at startup from the material, the source shape, the
/// cell size, and the stable step; the hot loop never touches the
/// original configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepParams {
    /// Cell size `h`.
    pub cell_size: f64,
    /// Stable time step `dt = Co·h²/α`.
    pub dt: f64,
    /// Laplacian scale `k / h²`.
    pub k_over_h2: f64,
    /// Volumetric heat capacity `ρ·c_p`.
    pub rho_cp: f64,
    /// Apparent-capacity augmentation `ρ·L_f / (T_liq − T_sol)`.
    pub latent_factor: f64,
    /// Solidus temperature.
    pub solidus: f64,
    /// Liquidus temperature.
    pub liquidus: f64,
    /// Inverse squared Gaussian radii `1/r_d²` per axis.
    pub radius_inv_sq: [f64; 3],
    /// Peak volumetric intensity per watt, `2·η/(π·√π·r_x·r_y·r_z)`.
    pub peak_intensity: f64,
    /// Exponent cutoff `ln 3 + 2·ln 10`: the source is dropped where
    /// `exp(-w)` falls below 1/3000 of peak (beyond ~3σ).
    pub source_cutoff: f64,
}

impl StepParams {
    /// Fold configuration into kernel constants.
    pub fn new(
        props: &MaterialProperties,
        source: &SourceShape,
        cell_size: f64,
        dt: f64,
    ) -> Self {
        let radii = source.radii();
        let radius_inv_sq = [
            1.0 / (radii[0] * radii[0]),
            1.0 / (radii[1] * radii[1]),
            1.0 / (radii[2] * radii[2]),
        ];
        Self {
            cell_size,
            dt,
            k_over_h2: props.thermal_conductivity / (cell_size * cell_size),
            rho_cp: props.volumetric_heat_capacity(),
            latent_factor: props.latent_heat_factor(),
            solidus: props.solidus,
            liquidus: props.liquidus,
            radius_inv_sq,
            peak_intensity: source.peak_intensity(),
            source_cutoff: 3.0f64.ln() + 2.0 * 10.0f64.ln(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_match_their_formulas() {
        let props = MaterialProperties::new(2.0, 3.0, 4.0, 5.0, 10.0, 20.0).unwrap();
        let source = SourceShape::new(0.5, [1.0, 2.0, 4.0]).unwrap();
        let p = StepParams::new(&props, &source, 0.5, 0.01);

        assert_eq!(p.k_over_h2, 4.0 / 0.25);
        assert_eq!(p.rho_cp, 6.0);
        assert_eq!(p.latent_factor, 2.0 * 5.0 / 10.0);
        // r_x = 1/sqrt(2) so 1/r_x^2 = 2.
        assert!((p.radius_inv_sq[0] - 2.0).abs() < 1e-12);
        assert!((p.radius_inv_sq[1] - 0.5).abs() < 1e-12);
        assert!((p.radius_inv_sq[2] - 0.125).abs() < 1e-12);
        assert!((p.source_cutoff - (3.0f64 * 100.0).ln()).abs() < 1e-12);
    }
}
