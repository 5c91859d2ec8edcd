//! On-disk configuration schema and validation.
//!
//! The driver reads a single TOML file naming the time controls, domain
//! geometry, material properties, beam source, and (optionally) the
//! solidification sampler. [`Input::validate`] is called once at startup;
//! every violation is fatal. Downstream crates consume the typed
//! accessors ([`Input::properties`], [`Input::source_shape`],
//! [`Input::time_control`]) rather than the raw sections.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::material::{MaterialProperties, SourceShape};
use crate::time::TimeControl;
use crate::Vec3;

/// Top-level configuration file contents.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Input {
    /// Time-loop controls.
    pub time: TimeSection,
    /// Domain geometry and decomposition.
    pub space: SpaceSection,
    /// Material properties.
    pub properties: PropertiesSection,
    /// Beam source shape and scan path.
    pub source: SourceSection,
    /// Solidification sampling; absent disables the recorder.
    #[serde(default)]
    pub sampling: Option<SamplingSection>,
}

/// `[time]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeSection {
    /// Courant number controlling the derived step size.
    #[serde(rename = "Co")]
    pub co: f64,
    /// Simulated start time in seconds.
    pub start_time: f64,
    /// Simulated end time in seconds.
    pub end_time: f64,
    /// Total snapshot emissions over the run; 0 suppresses periodic output.
    pub total_output_steps: u64,
    /// Total monitor records over the run; 0 suppresses periodic records.
    pub total_monitor_steps: u64,
}

/// `[space]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpaceSection {
    /// Uniform initial temperature in Kelvin.
    pub initial_temperature: f64,
    /// Uniform cell size in meters.
    pub cell_size: f64,
    /// Physical low corner of the global domain.
    pub global_low_corner: Vec3,
    /// Physical high corner of the global domain.
    pub global_high_corner: Vec3,
    /// Requested ranks per dimension. Zeros (or a product that disagrees
    /// with the communicator size) trigger the automatic partitioner.
    #[serde(default)]
    pub ranks_per_dim: Option<[u32; 3]>,
}

/// `[properties]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertiesSection {
    /// Density ρ in kg/m³.
    pub density: f64,
    /// Specific heat c_p in J/(kg·K).
    pub specific_heat: f64,
    /// Thermal conductivity k in W/(m·K).
    pub thermal_conductivity: f64,
    /// Latent heat of fusion L_f in J/kg.
    pub latent_heat: f64,
    /// Solidus temperature in K.
    pub solidus: f64,
    /// Liquidus temperature in K.
    pub liquidus: f64,
}

/// `[source]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    /// Absorption efficiency η.
    pub absorption: f64,
    /// Anisotropic 2σ widths per axis in meters.
    pub two_sigma: Vec3,
    /// Path to the scan-path text file.
    pub scan_path_file: PathBuf,
}

/// Column layout of the per-rank event CSV.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SamplingFormat {
    /// Nine columns: position, melt/solidification times, cooling rate,
    /// and the temperature gradient vector.
    #[default]
    Default,
    /// Six columns (no gradient), matching the ExaCA reader.
    Exaca,
}

/// `[sampling]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplingSection {
    /// Sampler kind; only `"solidification_data"` is recognized.
    #[serde(rename = "type")]
    pub kind: String,
    /// Event CSV column layout.
    #[serde(default)]
    pub format: SamplingFormat,
    /// Directory receiving one `data_<rank>.csv` per rank.
    pub directory_name: String,
}

impl Input {
    /// Parse a configuration from TOML text.
    pub fn from_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Read and parse a configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_str(&text)
    }

    /// Typed material properties.
    pub fn properties(&self) -> Result<MaterialProperties, ConfigError> {
        let p = &self.properties;
        MaterialProperties::new(
            p.density,
            p.specific_heat,
            p.thermal_conductivity,
            p.latent_heat,
            p.solidus,
            p.liquidus,
        )
    }

    /// Typed source shape.
    pub fn source_shape(&self) -> Result<SourceShape, ConfigError> {
        SourceShape::new(self.source.absorption, self.source.two_sigma)
    }

    /// Derived time-loop parameters.
    pub fn time_control(&self) -> Result<TimeControl, ConfigError> {
        let props = self.properties()?;
        TimeControl::derive(
            self.time.co,
            self.space.cell_size,
            props.diffusivity(),
            self.time.start_time,
            self.time.end_time,
            self.time.total_output_steps,
            self.time.total_monitor_steps,
        )
    }

    /// Check every semantic constraint; the first violation is returned.
    ///
    /// # Errors
    ///
    /// Returns `Err` for a non-positive cell size, inverted or degenerate
    /// domain corners, non-finite initial temperature, invalid material
    /// or source parameters, an empty scan-path filename, a bad time
    /// section, or an unrecognized sampler.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.space;
        if !s.cell_size.is_finite() || s.cell_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "space.cell_size".into(),
                reason: format!("must be finite and > 0, got {}", s.cell_size),
            });
        }
        for d in 0..3 {
            let (lo, hi) = (s.global_low_corner[d], s.global_high_corner[d]);
            if !lo.is_finite() || !hi.is_finite() || hi - lo < s.cell_size {
                return Err(ConfigError::Invalid {
                    field: "space.global_high_corner".into(),
                    reason: format!(
                        "axis {d}: [{lo}, {hi}] must span at least one cell of size {}",
                        s.cell_size
                    ),
                });
            }
        }
        if !s.initial_temperature.is_finite() {
            return Err(ConfigError::Invalid {
                field: "space.initial_temperature".into(),
                reason: format!("must be finite, got {}", s.initial_temperature),
            });
        }
        self.properties()?;
        self.source_shape()?;
        self.time_control()?;
        if self.source.scan_path_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "source.scan_path_file".into(),
                reason: "must not be empty".into(),
            });
        }
        if let Some(sampling) = &self.sampling {
            if sampling.kind != "solidification_data" {
                return Err(ConfigError::Invalid {
                    field: "sampling.type".into(),
                    reason: format!(
                        "unknown sampler '{}'; expected 'solidification_data'",
                        sampling.kind
                    ),
                });
            }
            if sampling.directory_name.is_empty() {
                return Err(ConfigError::Invalid {
                    field: "sampling.directory_name".into(),
                    reason: "must not be empty".into(),
                });
            }
        }
        Ok(())
    }
}
