//! Derived time-stepping descriptor.

use crate::error::ConfigError;

/// Time-loop parameters derived from configuration.
///
/// The stable step is `dt = Co · h² / α`. The step count covers
/// `[start_time, end_time]` with the final step allowed to overshoot
/// `end_time` by less than one `dt`. Output and monitor intervals are
/// derived from the requested total counts; a total of zero suppresses
/// periodic emission entirely (the interval is set past the loop end,
/// leaving only the forced terminal emission).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeControl {
    /// Simulated time at step 0.
    pub start_time: f64,
    /// Simulated time the loop must reach.
    pub end_time: f64,
    /// Step size in seconds.
    pub dt: f64,
    /// Number of steps in the loop.
    pub num_steps: u64,
    /// Emit a field snapshot every this many steps.
    pub output_interval: u64,
    /// Emit a monitor record every this many steps.
    pub monitor_interval: u64,
}

impl TimeControl {
    /// Derive the loop parameters.
    ///
    /// `co` is the Courant number, `cell_size` the uniform mesh spacing,
    /// and `diffusivity` the material's `α = k/(ρ·c_p)`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `co` is not in `(0, ∞)`, `cell_size` is not
    /// strictly positive, or `end_time <= start_time`.
    pub fn derive(
        co: f64,
        cell_size: f64,
        diffusivity: f64,
        start_time: f64,
        end_time: f64,
        total_output_steps: u64,
        total_monitor_steps: u64,
    ) -> Result<Self, ConfigError> {
        if !co.is_finite() || co <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "time.Co".into(),
                reason: format!("must be finite and > 0, got {co}"),
            });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "space.cell_size".into(),
                reason: format!("must be finite and > 0, got {cell_size}"),
            });
        }
        if !start_time.is_finite() || !end_time.is_finite() || end_time <= start_time {
            return Err(ConfigError::Invalid {
                field: "time.end_time".into(),
                reason: format!("must exceed start_time ({start_time}), got {end_time}"),
            });
        }

        let dt = co * cell_size * cell_size / diffusivity;
        let num_steps = ((end_time - start_time) / dt).ceil() as u64;
        let num_steps = num_steps.max(1);

        Ok(Self {
            start_time,
            end_time,
            dt,
            num_steps,
            output_interval: Self::interval(num_steps, total_output_steps),
            monitor_interval: Self::interval(num_steps, total_monitor_steps),
        })
    }

    /// Interval between emissions given a requested total count.
    ///
    /// Zero requested emissions maps to `num_steps + 1`, which never
    /// divides a step index inside the loop.
    fn interval(num_steps: u64, total: u64) -> u64 {
        if total == 0 {
            num_steps + 1
        } else {
            (num_steps / total).max(1)
        }
    }
}
