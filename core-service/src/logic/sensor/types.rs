//! Sensor Types
//!
//! Data structures only, no logic.

use serde::{Deserialize, Serialize};

use crate::constants::{CO2_THRESHOLD, OXYGEN_MIN, RADIATION_THRESHOLD, TOXIC_GAS_THRESHOLD};

// ============================================================================
// ENVIRONMENTAL READING
// ============================================================================

/// One complete set of sensor values.
///
/// Always replaced as a whole; there are no per-field setters.
/// Serializes to the `sensor` object of the wire snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalReading {
    /// Radiation level (uSv/h)
    pub radiation: f64,
    /// Toxic gas concentration (ppm)
    pub toxic_gas: f64,
    /// CO2 concentration (ppm)
    pub co2: f64,
    /// Oxygen concentration (percent)
    pub oxygen: f64,
}

impl EnvironmentalReading {
    pub const fn new(radiation: f64, toxic_gas: f64, co2: f64, oxygen: f64) -> Self {
        Self { radiation, toxic_gas, co2, oxygen }
    }
}

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Safety thresholds (configurable)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirQualityThresholds {
    /// Above this = high radiation (uSv/h)
    pub radiation: f64,
    /// Above this = toxic gas (ppm)
    pub toxic_gas: f64,
    /// Above this = CO2 too high (ppm)
    pub co2: f64,
    /// Below this = low oxygen (percent)
    pub oxygen_min: f64,
}

impl Default for AirQualityThresholds {
    fn default() -> Self {
        Self {
            radiation: RADIATION_THRESHOLD,
            toxic_gas: TOXIC_GAS_THRESHOLD,
            co2: CO2_THRESHOLD,
            oxygen_min: OXYGEN_MIN,
        }
    }
}
