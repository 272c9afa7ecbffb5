//! Synthetic Training Data
//!
//! Per-day consumption is `population * rate * emergency_level * activity_level`
//! plus Gaussian noise. Emergency level is a direct multiplicative factor,
//! which is what makes the fitted model scale with the live emergency level.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::features::RawFeatures;
use super::ForecastError;

/// Consumable resource a model can be trained for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Water,
    Food,
    Oxygen,
}

impl Resource {
    /// Consumption per person per day at level 1, activity 1.0
    pub fn daily_rate(&self) -> f64 {
        match self {
            Resource::Water => 5.0,
            Resource::Food => 2000.0,
            Resource::Oxygen => 550.0,
        }
    }

    /// Standard deviation of the training noise
    pub fn noise_std(&self) -> f64 {
        match self {
            Resource::Water => 10.0,
            Resource::Food => 500.0,
            Resource::Oxygen => 50.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Water => "water",
            Resource::Food => "food",
            Resource::Oxygen => "oxygen",
        }
    }
}

/// Emergency levels and their sampling weights
const LEVELS: [f64; 3] = [1.0, 2.0, 3.0];
const LEVEL_WEIGHTS: [f64; 3] = [0.7, 0.2, 0.1];

/// One feature row per day and one target column per resource
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub features: Vec<RawFeatures>,
    pub water: Vec<f64>,
    pub food: Vec<f64>,
    pub oxygen: Vec<f64>,
}

impl TrainingData {
    /// Generate `days` samples for a fixed population. Deterministic for a seed.
    pub fn generate(population: u32, days: u32, seed: u64) -> Result<Self, ForecastError> {
        if days == 0 {
            return Err(ForecastError::InvalidInput("training needs at least one day".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let level_dist = WeightedIndex::new(LEVEL_WEIGHTS)
            .map_err(|e| ForecastError::InvalidInput(e.to_string()))?;

        let capacity = days as usize;
        let mut data = Self {
            features: Vec::with_capacity(capacity),
            water: Vec::with_capacity(capacity),
            food: Vec::with_capacity(capacity),
            oxygen: Vec::with_capacity(capacity),
        };

        let people = population as f64;
        for day in 0..days {
            let level = LEVELS[level_dist.sample(&mut rng)];
            let activity: f64 = rng.gen_range(0.5..1.5);
            let load = people * level * activity;

            data.features.push([day as f64, people, level, activity]);
            for resource in [Resource::Water, Resource::Food, Resource::Oxygen] {
                let value = load * resource.daily_rate() + gaussian(&mut rng, resource.noise_std());
                data.targets_mut(resource).push(value);
            }
        }

        Ok(data)
    }

    pub fn targets(&self, resource: Resource) -> &[f64] {
        match resource {
            Resource::Water => &self.water,
            Resource::Food => &self.food,
            Resource::Oxygen => &self.oxygen,
        }
    }

    fn targets_mut(&mut self, resource: Resource) -> &mut Vec<f64> {
        match resource {
            Resource::Water => &mut self.water,
            Resource::Food => &mut self.food,
            Resource::Oxygen => &mut self.oxygen,
        }
    }
}

/// Zero-mean normal sample (Box-Muller)
fn gaussian<R: Rng>(rng: &mut R, std_dev: f64) -> f64 {
    // gen::<f64>() is in [0, 1); shift to (0, 1] so ln() stays finite
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    std_dev * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
