//! Per-Tick Assessment
//!
//! Reading -> (alert message, action plan). First match wins:
//! radiation, then toxic gas, then low oxygen, else normal.
//!
//! Only the radiation branch goes through the decision table. Gas and oxygen
//! use fixed alert/action strings, and CO2 never changes the alert. The
//! connected client matches on these exact strings.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::logic::decision::{classify, DecisionRecord, EmergencyCategory, Severity};
use crate::logic::sensor::{AirQualityThresholds, EnvironmentalReading};

/// Alert and action for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub alert_message: String,
    pub action_plan: String,
    /// Present only when the decision table was consulted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<DecisionRecord>,
}

impl Assessment {
    fn fixed(alert: &str, action: &str) -> Self {
        Self {
            alert_message: alert.to_string(),
            action_plan: action.to_string(),
            decision: None,
        }
    }
}

pub fn assess(reading: &EnvironmentalReading, thresholds: &AirQualityThresholds) -> Assessment {
    if reading.radiation > thresholds.radiation {
        let decision = classify(
            EmergencyCategory::RadiationHigh.as_str(),
            Some(Severity::High.as_str()),
        );
        return Assessment {
            alert_message: ALERT_RADIATION.to_string(),
            action_plan: format!("{}{}", ACTION_PREFIX, decision.immediate_action),
            decision: Some(decision),
        };
    }

    if reading.toxic_gas > thresholds.toxic_gas {
        return Assessment::fixed(ALERT_TOXIC_GAS, ACTION_SEAL_VENTS);
    }

    if reading.oxygen < thresholds.oxygen_min {
        return Assessment::fixed(ALERT_LOW_OXYGEN, ACTION_ELECTROLYSIS);
    }

    Assessment::fixed(ALERT_NORMAL, ACTION_MONITORING)
}
