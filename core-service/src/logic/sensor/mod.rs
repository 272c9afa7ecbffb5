//! Sensor Module
//!
//! Environmental readings, safety thresholds and the air-quality check.
//!
//! ## Structure
//! - `types`: EnvironmentalReading, AirQualityThresholds
//! - `monitor`: check_air_quality (every breached threshold, in fixed order)

pub mod types;
pub mod monitor;

pub use types::{AirQualityThresholds, EnvironmentalReading};
pub use monitor::{check_air_quality, AirQualityAlert};
