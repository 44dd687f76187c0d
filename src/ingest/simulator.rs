/// Simulated sensor snapshots
///
/// When no plant gateway is reachable, use this module to generate readings
/// for every registered parameter. Values are drawn uniformly inside each
/// regulatory band; with `excursion_probability > 0` a value is pushed
/// outside it so the alerting path gets exercised.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ingest::{IngestError, ReadingSource};
use crate::logging::{self, Component};
use crate::model::Reading;
use crate::parameters::PARAMETER_REGISTRY;

/// How far past a bound an excursion may land, as a fraction of the band width.
const MAX_EXCURSION_FRACTION: f64 = 0.2;

/// Configuration and state for simulated readings
pub struct ReadingSimulator {
    plant: String,
    rng: StdRng,
    /// Chance, per reading, of landing outside the band; always in [0, 1]
    excursion_probability: f64,
}

impl ReadingSimulator {
    /// Create a simulator seeded from the OS
    pub fn new(plant: impl Into<String>) -> Self {
        Self::with_rng(plant, StdRng::from_entropy())
    }

    /// Create a reproducible simulator
    pub fn seeded(plant: impl Into<String>, seed: u64) -> Self {
        Self::with_rng(plant, StdRng::seed_from_u64(seed))
    }

    fn with_rng(plant: impl Into<String>, rng: StdRng) -> Self {
        Self {
            plant: plant.into(),
            rng,
            excursion_probability: 0.0,
        }
    }

    /// Sets the excursion chance, clamped to [0, 1]. NaN and infinities
    /// disable excursions.
    pub fn with_excursions(mut self, probability: f64) -> Self {
        self.excursion_probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    pub fn excursion_probability(&self) -> f64 {
        self.excursion_probability
    }

    /// One reading per registered parameter, in registry order
    pub fn snapshot(&mut self) -> Vec<Reading> {
        let mut readings = Vec::with_capacity(PARAMETER_REGISTRY.len());
        for spec in PARAMETER_REGISTRY {
            let (min, max) = (spec.limit.min, spec.limit.max);
            let span = (max - min).max(f64::EPSILON);

            let value = if self.rng.gen_bool(self.excursion_probability) {
                let overshoot = span * self.rng.gen_range(0.01..=MAX_EXCURSION_FRACTION);
                if self.rng.gen_bool(0.5) && min > 0.0 {
                    min - overshoot.min(min)
                } else {
                    max + overshoot
                }
            } else {
                self.rng.gen_range(min..=max)
            };

            readings.push(Reading::new(spec.name, value));
        }
        readings
    }
}

impl ReadingSource for ReadingSimulator {
    fn name(&self) -> &str {
        &self.plant
    }

    fn next_snapshot(&mut self) -> Result<Vec<Reading>, IngestError> {
        let readings = self.snapshot();
        logging::debug(
            Component::Simulator,
            Some(&self.plant),
            &format!("generated {} readings", readings.len()),
        );
        Ok(readings)
    }
}
