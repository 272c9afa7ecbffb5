//! Forecast Module - Consumable Depletion Forecast
//!
//! Polynomial regression over (day, population, emergency level, activity level).
//! The streaming loop only sees the `Forecaster` trait; training, fitting and
//! persistence stay in here so the model can be swapped.
//!
//! ## Structure
//! - `features`: degree-2 polynomial expansion
//! - `training`: synthetic training data
//! - `model`: ConsumptionModel (fit, R^2, forecast, save/load)

pub mod features;
pub mod training;
pub mod model;

use thiserror::Error;

pub use model::ConsumptionModel;
pub use training::Resource;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("model is not trained")]
    NotTrained,

    #[error("invalid forecast input: {0}")]
    InvalidInput(String),

    #[error("degenerate model: {0}")]
    Degenerate(String),

    #[error("model persistence failed: {0}")]
    Persistence(String),
}

// ============================================================================
// FORECASTER TRAIT
// ============================================================================

/// Consumption forecast as seen by the streaming loop.
///
/// Returns one non-negative estimate per day, for days
/// `current_day .. current_day + horizon_days`.
pub trait Forecaster: Send + Sync {
    fn forecast(
        &self,
        current_day: u32,
        population: u32,
        emergency_level: u8,
        activity_level: f64,
        horizon_days: usize,
    ) -> Result<Vec<f64>, ForecastError>;
}
