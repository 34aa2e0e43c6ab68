use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::sensors::SensorKind;

/// Hands out reproducible noise streams derived from one master seed.
///
/// Every sensor kind reads its own ChaCha stream, so adding an accelerometer
/// never perturbs the gyro sequence of an otherwise identical run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSource {
    master_seed: u64,
}

impl SeedSource {
    pub fn new(seed: u64) -> Self {
        Self { master_seed: seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn rng_for(&self, kind: SensorKind) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.master_seed);
        rng.set_stream(kind.stream_id());
        rng
    }
}
