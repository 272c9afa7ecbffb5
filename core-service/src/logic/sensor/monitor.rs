//! Air Quality Monitor
//!
//! Lists every breached threshold. Unlike the per-tick assessment, this is not
//! first-match-wins: a reading can raise several alerts at once.

use serde::{Deserialize, Serialize};

use super::types::{AirQualityThresholds, EnvironmentalReading};

/// A single breached threshold and the system response it calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityAlert {
    HighRadiation,
    ToxicGas,
    HighCo2,
    LowOxygen,
}

impl AirQualityAlert {
    pub fn as_str(&self) -> &'static str {
        match self {
            AirQualityAlert::HighRadiation => "high_radiation",
            AirQualityAlert::ToxicGas => "toxic_gas",
            AirQualityAlert::HighCo2 => "high_co2",
            AirQualityAlert::LowOxygen => "low_oxygen",
        }
    }

    /// Automatic response for this alert
    pub fn response(&self) -> &'static str {
        match self {
            AirQualityAlert::HighRadiation => "High radiation alert! Activating lead shielding",
            AirQualityAlert::ToxicGas => {
                "Toxic gas detected! Switching to internal circulation mode"
            }
            AirQualityAlert::HighCo2 => "CO2 level too high! Activating carbon filter",
            AirQualityAlert::LowOxygen => {
                "Oxygen level low! Activating electrolysis oxygen generator"
            }
        }
    }
}

impl std::fmt::Display for AirQualityAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check a reading against thresholds.
///
/// Order: radiation, toxic gas, CO2, oxygen.
pub fn check_air_quality(
    reading: &EnvironmentalReading,
    thresholds: &AirQualityThresholds,
) -> Vec<AirQualityAlert> {
    let mut alerts = Vec::new();

    if reading.radiation > thresholds.radiation {
        alerts.push(AirQualityAlert::HighRadiation);
    }
    if reading.toxic_gas > thresholds.toxic_gas {
        alerts.push(AirQualityAlert::ToxicGas);
    }
    if reading.co2 > thresholds.co2 {
        alerts.push(AirQualityAlert::HighCo2);
    }
    if reading.oxygen < thresholds.oxygen_min {
        alerts.push(AirQualityAlert::LowOxygen);
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_reading_has_no_alerts() {
        let reading = EnvironmentalReading::new(10.0, 0.0, 400.0, 21.0);
        assert!(check_air_quality(&reading, &AirQualityThresholds::default()).is_empty());
    }

    #[test]
    fn test_all_alerts_in_order() {
        let reading = EnvironmentalReading::new(150.0, 80.0, 7000.0, 18.0);
        let alerts = check_air_quality(&reading, &AirQualityThresholds::default());
        assert_eq!(
            alerts,
            vec![
                AirQualityAlert::HighRadiation,
                AirQualityAlert::ToxicGas,
                AirQualityAlert::HighCo2,
                AirQualityAlert::LowOxygen,
            ]
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        // Exactly at the threshold is not a breach
        let reading = EnvironmentalReading::new(100.0, 50.0, 5000.0, 19.5);
        assert!(check_air_quality(&reading, &AirQualityThresholds::default()).is_empty());
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = AirQualityThresholds {
            co2: 300.0,
            ..Default::default()
        };
        let reading = EnvironmentalReading::new(10.0, 0.0, 400.0, 21.0);
        assert_eq!(check_air_quality(&reading, &thresholds), vec![AirQualityAlert::HighCo2]);
    }
}
