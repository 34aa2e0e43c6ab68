use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Gravitational acceleration at the surface (m/s²)
pub const STANDARD_GRAVITY: f64 = 9.81;
/// Air density at 15 °C, sea level (kg/m³)
pub const SEA_LEVEL_AIR_DENSITY: f64 = 1.225;

/// Environment constants shared read-only by every simulation call.
///
/// # Fields
///
/// * `g` - Gravitational acceleration (m/s²), acting along world -y
/// * `fluid_density` - Density of the surrounding fluid (kg/m³)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct World {
    pub g: f64,
    pub fluid_density: f64,
}

impl Default for World {
    fn default() -> Self {
        Self {
            g: STANDARD_GRAVITY,
            fluid_density: SEA_LEVEL_AIR_DENSITY,
        }
    }
}

impl World {
    pub fn new(g: f64, fluid_density: f64) -> Self {
        Self { g, fluid_density }
    }

    /// Weight of a body of the given mass (N).
    pub fn weight(&self, mass: f64) -> f64 {
        self.g * mass
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.g.is_finite() {
            return Err(ConfigError::invalid("world.g", self.g, "must be finite"));
        }
        if !self.fluid_density.is_finite() || self.fluid_density < 0.0 {
            return Err(ConfigError::invalid(
                "world.fluid_density",
                self.fluid_density,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}
