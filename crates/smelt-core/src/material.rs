//! Material and beam-source parameters.

use crate::error::ConfigError;
use crate::Vec3;

/// Thermophysical properties of the processed material.
///
/// All fields are SI: kg/m³, J/(kg·K), W/(m·K), J/kg, K. The mushy
/// interval `[solidus, liquidus]` drives the apparent-heat-capacity
/// treatment of latent heat in the solver and the liquidus-crossing
/// detection in the event sampler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialProperties {
    /// Density ρ.
    pub density: f64,
    /// Specific heat c_p.
    pub specific_heat: f64,
    /// Thermal conductivity k.
    pub thermal_conductivity: f64,
    /// Latent heat of fusion L_f.
    pub latent_heat: f64,
    /// Solidus temperature.
    pub solidus: f64,
    /// Liquidus temperature.
    pub liquidus: f64,
}

impl MaterialProperties {
    /// Create a validated property set.
    ///
    /// # Errors
    ///
    /// Returns `Err` if density, specific heat, or conductivity is not
    /// strictly positive, latent heat is negative, any value is
    /// non-finite, or `liquidus <= solidus` (the apparent-heat-capacity
    /// factor divides by the mushy interval width).
    pub fn new(
        density: f64,
        specific_heat: f64,
        thermal_conductivity: f64,
        latent_heat: f64,
        solidus: f64,
        liquidus: f64,
    ) -> Result<Self, ConfigError> {
        let props = Self {
            density,
            specific_heat,
            thermal_conductivity,
            latent_heat,
            solidus,
            liquidus,
        };
        props.validate()?;
        Ok(props)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("properties.density", self.density),
            ("properties.specific_heat", self.specific_heat),
            ("properties.thermal_conductivity", self.thermal_conductivity),
        ];
        for (field, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: format!("must be finite and > 0, got {v}"),
                });
            }
        }
        if !self.latent_heat.is_finite() || self.latent_heat < 0.0 {
            return Err(ConfigError::Invalid {
                field: "properties.latent_heat".into(),
                reason: format!("must be finite and >= 0, got {}", self.latent_heat),
            });
        }
        if !self.solidus.is_finite() || !self.liquidus.is_finite() {
            return Err(ConfigError::Invalid {
                field: "properties.solidus/liquidus".into(),
                reason: "must be finite".into(),
            });
        }
        if self.liquidus <= self.solidus {
            return Err(ConfigError::Invalid {
                field: "properties.liquidus".into(),
                reason: format!(
                    "liquidus ({}) must exceed solidus ({})",
                    self.liquidus, self.solidus
                ),
            });
        }
        Ok(())
    }

    /// Thermal diffusivity `α = k / (ρ·c_p)`.
    pub fn diffusivity(&self) -> f64 {
        self.thermal_conductivity / (self.density * self.specific_heat)
    }

    /// Volumetric heat capacity `ρ·c_p`.
    pub fn volumetric_heat_capacity(&self) -> f64 {
        self.density * self.specific_heat
    }

    /// Apparent-heat-capacity augmentation over the mushy interval,
    /// `ρ·L_f / (liquidus − solidus)`.
    pub fn latent_heat_factor(&self) -> f64 {
        self.density * self.latent_heat / (self.liquidus - self.solidus)
    }
}

/// Geometry and efficiency of the Gaussian volumetric heat source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceShape {
    /// Absorption efficiency η (fraction of nominal beam power deposited).
    pub absorption: f64,
    /// Anisotropic 2σ widths per axis, in meters. Stored as absolute
    /// values regardless of the sign given in configuration.
    pub two_sigma: Vec3,
}

impl SourceShape {
    /// Create a validated source shape. Negative `two_sigma` components
    /// are folded to their absolute value.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `absorption` is outside `(0, 1]` or any
    /// `two_sigma` component is zero or non-finite (the peak intensity
    /// divides by the product of the radii).
    pub fn new(absorption: f64, two_sigma: Vec3) -> Result<Self, ConfigError> {
        if !absorption.is_finite() || absorption <= 0.0 || absorption > 1.0 {
            return Err(ConfigError::Invalid {
                field: "source.absorption".into(),
                reason: format!("must be in (0, 1], got {absorption}"),
            });
        }
        let mut abs_sigma = [0.0; 3];
        for d in 0..3 {
            let v = two_sigma[d];
            if !v.is_finite() || v == 0.0 {
                return Err(ConfigError::Invalid {
                    field: "source.two_sigma".into(),
                    reason: format!("component {d} must be finite and nonzero, got {v}"),
                });
            }
            abs_sigma[d] = v.abs();
        }
        Ok(Self {
            absorption,
            two_sigma: abs_sigma,
        })
    }

    /// Gaussian radii `r_d = two_sigma_d / √2` per axis.
    pub fn radii(&self) -> Vec3 {
        let s = std::f64::consts::SQRT_2;
        [
            self.two_sigma[0] / s,
            self.two_sigma[1] / s,
            self.two_sigma[2] / s,
        ]
    }

    /// Peak volumetric intensity per watt of beam power,
    /// `I0 = 2·η / (π·√π·r_x·r_y·r_z)`.
    pub fn peak_intensity(&self) -> f64 {
        let [rx, ry, rz] = self.radii();
        let pi = std::f64::consts::PI;
        2.0 * self.absorption / (pi * pi.sqrt() * rx * ry * rz)
    }
}
