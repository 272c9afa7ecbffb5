//! Analyzer
//!
//! Turns one copy of the habitat state into one StatusSnapshot:
//! assessment (alert + action) plus tomorrow's water forecast.
//!
//! The forecast always receives the emergency level of the state being
//! analysed. A constant level here would make the forecast stop reacting to
//! the scenario without any visible error.

use std::sync::Arc;

use crate::config::Config;
use crate::constants::FORECAST_SENTINEL;
use crate::logic::assessment::{assess, Assessment};
use crate::logic::forecast::{ForecastError, Forecaster};
use crate::logic::sensor::{check_air_quality, AirQualityAlert, AirQualityThresholds};
use crate::logic::snapshot::{round_forecast, StatusSnapshot};
use crate::logic::state::HabitatState;

/// Fixed forecast inputs (the day never advances)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastBaseline {
    pub current_day: u32,
    pub population: u32,
    pub activity_level: f64,
}

impl ForecastBaseline {
    pub fn from_config(config: &Config) -> Self {
        Self {
            current_day: config.baseline_day,
            population: config.baseline_population,
            activity_level: config.activity_level,
        }
    }
}

/// Full result of analysing one state
#[derive(Debug, Clone)]
pub struct Analysis {
    pub snapshot: StatusSnapshot,
    pub assessment: Assessment,
    /// Every breached threshold (informational)
    pub air_quality: Vec<AirQualityAlert>,
    pub forecast_error: Option<String>,
}

pub struct Analyzer {
    thresholds: AirQualityThresholds,
    baseline: ForecastBaseline,
    forecaster: Arc<dyn Forecaster>,
}

impl Analyzer {
    pub fn new(
        thresholds: AirQualityThresholds,
        baseline: ForecastBaseline,
        forecaster: Arc<dyn Forecaster>,
    ) -> Self {
        Self {
            thresholds,
            baseline,
            forecaster,
        }
    }

    pub fn from_config(config: &Config, forecaster: Arc<dyn Forecaster>) -> Self {
        Self::new(config.thresholds, ForecastBaseline::from_config(config), forecaster)
    }

    pub fn analyze(&self, state: &HabitatState) -> Analysis {
        let assessment = assess(&state.reading, &self.thresholds);
        let air_quality = check_air_quality(&state.reading, &self.thresholds);

        let (prediction_water, forecast_error) = match self.forecast_tomorrow(state) {
            Ok(value) => (round_forecast(value), None),
            Err(e) => (FORECAST_SENTINEL, Some(e.to_string())),
        };

        let snapshot = StatusSnapshot {
            sensor: state.reading,
            alert_message: assessment.alert_message.clone(),
            action_plan: assessment.action_plan.clone(),
            prediction_water,
            mode: state.scenario.token().to_string(),
        };

        Analysis {
            snapshot,
            assessment,
            air_quality,
            forecast_error,
        }
    }

    fn forecast_tomorrow(&self, state: &HabitatState) -> Result<f64, ForecastError> {
        let estimates = self.forecaster.forecast(
            self.baseline.current_day,
            self.baseline.population,
            state.level.as_factor(),
            self.baseline.activity_level,
            1,
        )?;

        estimates
            .first()
            .copied()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| ForecastError::Degenerate("no usable estimate".to_string()))
    }
}
