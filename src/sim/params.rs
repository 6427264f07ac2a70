//! Per-vehicle tuning values and their JSON parameter files

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Vehicle tuning record.
///
/// Lengths are in meters; the integrator scales them by
/// `PhysicsConfig::pixels_per_meter`. Cloning copies the gear table, so
/// per-vehicle edits never leak back into a shared template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleParameters {
    /// Longitudinal (back and forth) suspension response rate
    pub l_slope: f32,
    /// Lateral (left and right) suspension response rate
    pub w_slope: f32,
    /// Damper (shock absorber) stiffness
    pub damper_stiffness: f32,
    /// Body width (meters)
    pub width: f32,
    /// Body length (meters)
    pub height: f32,
    /// Acceleration multiplier per gear. A value of exactly zero is neutral.
    pub gears_acceleration: Vec<f32>,
    /// Turning radius (meters)
    pub turning_radius: f32,
    pub control_sensitivity: f32,
    /// Distance between the rear axle and the center of gravity (meters)
    pub distance_racg: f32,
    pub engine_power: f32,
    pub speed_max: f32,
}

impl Default for VehicleParameters {
    fn default() -> Self {
        Self {
            l_slope: 2.0,
            w_slope: 3.5,
            damper_stiffness: 3.0,
            width: 1.85,
            height: 2.3,
            gears_acceleration: vec![-0.3, 0.000000001, 0.3, 0.566, 0.8, 1.0],
            turning_radius: 5.7,
            control_sensitivity: 1.0,
            distance_racg: 1.25,
            engine_power: 0.3,
            speed_max: 100.0,
        }
    }
}

impl VehicleParameters {
    /// Acceleration multiplier for `gear`; gears outside the table are neutral
    pub fn gear_acceleration(&self, gear: usize) -> f32 {
        self.gears_acceleration.get(gear).copied().unwrap_or(0.0)
    }

    pub fn gear_count(&self) -> usize {
        self.gears_acceleration.len()
    }

    pub fn with_engine_power(mut self, engine_power: f32) -> Self {
        self.engine_power = engine_power;
        self
    }

    pub fn with_speed_max(mut self, speed_max: f32) -> Self {
        self.speed_max = speed_max;
        self
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.gears_acceleration.is_empty() {
            return Err(ParamsError::NoGears);
        }
        Ok(())
    }

    /// Load a parameter file written by [`VehicleParameters::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let raw = fs::read_to_string(path)?;
        let params: VehicleParameters = serde_json::from_str(&raw)?;
        params.validate()?;
        Ok(params)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ParamsError> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }
}

/// Parameter file and gear errors
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Failed to access parameter file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Gear acceleration table is empty")]
    NoGears,

    #[error("Gear {gear} is outside the gear table (0..{count})")]
    GearOutOfRange { gear: usize, count: usize },
}
