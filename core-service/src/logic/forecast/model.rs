//! Consumption Model
//!
//! Ordinary least squares on degree-2 polynomial features, solved through an
//! SVD pseudo-inverse. Columns that are constant in the training data (the
//! population is fixed) make the design matrix rank-deficient; the
//! pseudo-inverse picks the minimum-norm solution instead of failing.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::features::{expand, RawFeatures, POLY_FEATURES};
use super::training::{Resource, TrainingData};
use super::{ForecastError, Forecaster};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Fitted coefficients plus metadata. This is what gets persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub resource: Resource,
    /// One coefficient per polynomial feature
    pub coefficients: Vec<f64>,
    /// Coefficient of determination on the training data
    pub r_squared: f64,
    pub samples: usize,
    pub trained_at: DateTime<Utc>,
}

/// Consumption forecast model. Untrained until `train` or `load` succeeds.
#[derive(Debug, Clone, Default)]
pub struct ConsumptionModel {
    fitted: Option<FittedModel>,
}

impl ConsumptionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fitted(&self) -> Option<&FittedModel> {
        self.fitted.as_ref()
    }

    /// Fit on raw feature rows. Returns R^2 on the training data.
    pub fn train(
        &mut self,
        resource: Resource,
        features: &[RawFeatures],
        targets: &[f64],
    ) -> Result<f64, ForecastError> {
        if features.is_empty() {
            return Err(ForecastError::Degenerate("no training samples".to_string()));
        }
        if features.len() != targets.len() {
            return Err(ForecastError::InvalidInput(format!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            )));
        }
        if features.iter().flatten().chain(targets).any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidInput("non-finite training value".to_string()));
        }

        let rows: Vec<[f64; POLY_FEATURES]> = features.iter().map(expand).collect();
        let x = DMatrix::from_fn(rows.len(), POLY_FEATURES, |i, j| rows[i][j]);
        let y = DVector::from_column_slice(targets);

        let svd = x.svd(true, true);
        // Singular values below this relative cutoff count as zero
        let tolerance =
            svd.singular_values.max() * f64::EPSILON * rows.len().max(POLY_FEATURES) as f64;
        let solution = svd
            .solve(&y, tolerance)
            .map_err(|e| ForecastError::Degenerate(e.to_string()))?;

        let coefficients: Vec<f64> = solution.iter().copied().collect();
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::Degenerate("non-finite coefficients".to_string()));
        }

        let r_squared = r_squared(&rows, &coefficients, targets);

        tracing::debug!(
            resource = resource.as_str(),
            samples = rows.len(),
            r_squared,
            "consumption model fitted"
        );

        self.fitted = Some(FittedModel {
            resource,
            coefficients,
            r_squared,
            samples: rows.len(),
            trained_at: Utc::now(),
        });

        Ok(r_squared)
    }

    /// Fit on one target column of generated training data
    pub fn train_on(
        &mut self,
        data: &TrainingData,
        resource: Resource,
    ) -> Result<f64, ForecastError> {
        self.train(resource, &data.features, data.targets(resource))
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    pub fn save(&self, path: &Path) -> Result<(), ForecastError> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotTrained)?;
        let json = serde_json::to_string_pretty(fitted)
            .map_err(|e| ForecastError::Persistence(e.to_string()))?;
        fs::write(path, json)
            .map_err(|e| ForecastError::Persistence(format!("{}: {}", path.display(), e)))
    }

    pub fn load(path: &Path) -> Result<Self, ForecastError> {
        let json = fs::read_to_string(path)
            .map_err(|e| ForecastError::Persistence(format!("{}: {}", path.display(), e)))?;
        let fitted: FittedModel =
            serde_json::from_str(&json).map_err(|e| ForecastError::Persistence(e.to_string()))?;

        if fitted.coefficients.len() != POLY_FEATURES {
            return Err(ForecastError::Persistence(format!(
                "expected {} coefficients, found {}",
                POLY_FEATURES,
                fitted.coefficients.len()
            )));
        }
        if fitted.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::Degenerate("non-finite coefficients".to_string()));
        }

        Ok(Self { fitted: Some(fitted) })
    }

    /// Load a pre-fitted model from `path` if it exists, otherwise train on
    /// synthetic data and (when a path is given) save the result there.
    pub fn load_or_train(
        path: Option<&Path>,
        resource: Resource,
        population: u32,
        days: u32,
        seed: u64,
    ) -> Result<Self, ForecastError> {
        if let Some(path) = path.filter(|p| p.exists()) {
            let model = Self::load(path)?;
            tracing::info!(path = %path.display(), "pre-fitted model loaded");
            return Ok(model);
        }

        let data = TrainingData::generate(population, days, seed)?;
        let mut model = Self::new();
        let r_squared = model.train_on(&data, resource)?;
        tracing::info!(
            resource = resource.as_str(),
            samples = data.features.len(),
            r_squared,
            "model trained"
        );

        if let Some(path) = path {
            match model.save(path) {
                Ok(()) => tracing::info!(path = %path.display(), "model saved"),
                Err(e) => tracing::warn!("could not save model: {}", e),
            }
        }

        Ok(model)
    }
}

impl Forecaster for ConsumptionModel {
    fn forecast(
        &self,
        current_day: u32,
        population: u32,
        emergency_level: u8,
        activity_level: f64,
        horizon_days: usize,
    ) -> Result<Vec<f64>, ForecastError> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::NotTrained)?;

        if horizon_days == 0 {
            return Err(ForecastError::InvalidInput("horizon must be at least one day".to_string()));
        }
        if !(1..=3).contains(&emergency_level) {
            return Err(ForecastError::InvalidInput(format!(
                "emergency level {} outside 1..=3",
                emergency_level
            )));
        }
        if !activity_level.is_finite() || activity_level < 0.0 {
            return Err(ForecastError::InvalidInput(format!(
                "activity level {} must be finite and non-negative",
                activity_level
            )));
        }

        (0..horizon_days)
            .map(|offset| {
                let raw = [
                    current_day as f64 + offset as f64,
                    population as f64,
                    emergency_level as f64,
                    activity_level,
                ];
                let value = dot(&expand(&raw), &fitted.coefficients);
                if value.is_finite() {
                    Ok(value.max(0.0))
                } else {
                    Err(ForecastError::Degenerate(format!(
                        "non-finite estimate for day {}",
                        raw[0]
                    )))
                }
            })
            .collect()
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn dot(row: &[f64], coefficients: &[f64]) -> f64 {
    row.iter().zip(coefficients).map(|(a, b)| a * b).sum()
}

fn r_squared(rows: &[[f64; POLY_FEATURES]], coefficients: &[f64], targets: &[f64]) -> f64 {
    let n = targets.len() as f64;
    let mean = targets.iter().sum::<f64>() / n;

    let ss_tot: f64 = targets.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = rows
        .iter()
        .zip(targets)
        .map(|(row, y)| (y - dot(row, coefficients)).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}
