//! Status Snapshot & Wire Framing
//!
//! One JSON object per tick, UTF-8, terminated by a single `\n`.
//! No length prefix: consumers buffer and split on newline.
//!
//! ```text
//! {"sensor":{"radiation":10.0,"toxic_gas":0.0,"co2":400.0,"oxygen":21.0},
//!  "alert_message":"SYSTEM NORMAL","action_plan":"MONITORING",
//!  "prediction_water":251.3,"mode":"n"}
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::FORECAST_SENTINEL;
use crate::logic::sensor::EnvironmentalReading;

pub const FRAME_DELIMITER: u8 = b'\n';

/// Unit of wire transmission. Never batched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub sensor: EnvironmentalReading,
    pub alert_message: String,
    pub action_plan: String,
    /// Tomorrow's water estimate, or -1 when the forecast failed
    pub prediction_water: f64,
    /// Active scenario token (n/r/g/o)
    pub mode: String,
}

impl StatusSnapshot {
    pub fn forecast_failed(&self) -> bool {
        self.prediction_water == FORECAST_SENTINEL
    }
}

/// Round a forecast for display (one decimal place)
pub fn round_forecast(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Serialize one snapshot as a complete frame (JSON + trailing newline)
pub fn encode_frame(snapshot: &StatusSnapshot) -> Result<Vec<u8>, serde_json::Error> {
    let mut frame = serde_json::to_vec(snapshot)?;
    frame.push(FRAME_DELIMITER);
    Ok(frame)
}

/// Parse one frame (trailing newline optional)
#[cfg(test)]
pub fn decode_frame(line: &str) -> Result<StatusSnapshot, serde_json::Error> {
    serde_json::from_str(line.trim_end_matches(&['\r', '\n'][..]))
}
