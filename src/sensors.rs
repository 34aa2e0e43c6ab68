//! Noisy read-only views of the aircraft state.
//!
//! Both sensors share one noise model: independent zero-mean Gaussian noise of
//! standard deviation `sigma` on each component. With `sigma == 0` a reading is
//! the exact state value, which keeps tests bit-for-bit reproducible.

use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::aircraft::Aircraft;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Reads the body up axis (orientation)
    Gyro,
    /// Reads the body-frame net specific force
    Accelerometer,
}

impl SensorKind {
    pub(crate) fn stream_id(self) -> u64 {
        match self {
            SensorKind::Gyro => 1,
            SensorKind::Accelerometer => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sensor {
    kind: SensorKind,
    sigma: f64,
    noise: Option<Normal<f64>>,
    rng: ChaCha8Rng,
}

impl Sensor {
    /// Creates a sensor drawing its noise from `rng`.
    ///
    /// # Arguments
    ///
    /// * `kind` - Which part of the aircraft state the sensor reads
    /// * `sigma` - Standard deviation of the per-component noise, must be finite and >= 0
    /// * `rng` - Noise source; seed it to replay a run
    pub fn new(kind: SensorKind, sigma: f64, rng: ChaCha8Rng) -> Result<Self, ConfigError> {
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(ConfigError::invalid(
                "sensor.sigma",
                sigma,
                "must be finite and non-negative",
            ));
        }
        let noise = if sigma == 0.0 {
            None
        } else {
            Some(
                Normal::new(0.0, sigma)
                    .map_err(|_| ConfigError::invalid("sensor.sigma", sigma, "bad variance"))?,
            )
        };
        Ok(Self {
            kind,
            sigma,
            noise,
            rng,
        })
    }

    pub fn with_seed(kind: SensorKind, sigma: f64, seed: u64) -> Result<Self, ConfigError> {
        Self::new(kind, sigma, ChaCha8Rng::seed_from_u64(seed))
    }

    /// A noiseless sensor.
    pub fn exact(kind: SensorKind) -> Self {
        Self {
            kind,
            sigma: 0.0,
            noise: None,
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn randomize_vector(&mut self, v: &Vector3<f64>) -> Vector3<f64> {
        match &self.noise {
            None => *v,
            Some(normal) => {
                let rng = &mut self.rng;
                v + Vector3::new(normal.sample(rng), normal.sample(rng), normal.sample(rng))
            }
        }
    }

    pub fn read(&mut self, aircraft: &Aircraft) -> Vector3<f64> {
        let truth = match self.kind {
            SensorKind::Gyro => aircraft.normal,
            SensorKind::Accelerometer => aircraft.acceleration,
        };
        self.randomize_vector(&truth)
    }
}
