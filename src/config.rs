use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aircraft::AircraftConfig;
use crate::control::{FlightMode, PidGains};
use crate::error::ConfigError;
use crate::world::World;

/// Settings of the simulation loop itself.
///
/// # Fields
///
/// * `steps` - Physics rate (Hz)
/// * `cycle_time` - Attitude controller period (seconds)
/// * `mode` - Stick interpretation of the controller
/// * `gyro_sigma`, `accelerometer_sigma` - Sensor noise standard deviations
/// * `seed` - Master seed for all sensor noise
/// * `renormalize_orientation` - Rescale the body up axis to unit length every step
/// * `start_trimmed` - Spin motors up to hover thrust on every reset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub steps: u32,
    pub cycle_time: f64,
    pub mode: FlightMode,
    pub gyro_sigma: f64,
    pub accelerometer_sigma: f64,
    pub seed: u64,
    pub renormalize_orientation: bool,
    pub start_trimmed: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: 5000,
            cycle_time: 0.002,
            mode: FlightMode::Stable,
            gyro_sigma: 0.0,
            accelerometer_sigma: 0.0,
            seed: 0,
            renormalize_orientation: true,
            start_trimmed: false,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps == 0 {
            return Err(ConfigError::invalid(
                "simulation.steps",
                0.0,
                "physics rate must be at least 1 Hz",
            ));
        }
        if !(self.cycle_time.is_finite() && self.cycle_time > 0.0) {
            return Err(ConfigError::invalid(
                "simulation.cycle_time",
                self.cycle_time,
                "must be positive",
            ));
        }
        for (name, sigma) in [
            ("simulation.gyro_sigma", self.gyro_sigma),
            ("simulation.accelerometer_sigma", self.accelerometer_sigma),
        ] {
            if !(sigma.is_finite() && sigma >= 0.0) {
                return Err(ConfigError::invalid(
                    name,
                    sigma,
                    "must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }

    pub fn dt(&self) -> f64 {
        1.0 / self.steps as f64
    }
}

/// Complete description of a flight: environment, airframe, loop and gains.
///
/// Every section is optional in the YAML source and falls back to its default.
///
/// # Example
///
/// aircraft:
///   mass: 1.2
///   radius: 0.3
/// simulation:
///   mode: acro
///   gyro_sigma: 0.01
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world: World,
    pub aircraft: AircraftConfig,
    pub simulation: SimulationConfig,
    pub gains: PidGains,
}

impl Config {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&source)?;
        log::debug!("loaded flight config from {}", path.display());
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.aircraft.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}
