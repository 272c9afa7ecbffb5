//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! `config.rs` reads the environment and falls back to these values.

/// Default bind port
///
/// The visualization client connects to this port; keep it in sync with the client.
pub const DEFAULT_PORT: u16 = 65500;

/// Listen backlog. Exactly one peer is ever accepted.
pub const LISTEN_BACKLOG: u32 = 1;

/// Default tick period (milliseconds)
pub const DEFAULT_TICK_MS: u64 = 1000;

// ============================================
// Forecast baselines
// ============================================

/// Day passed to the forecast on every tick
pub const DEFAULT_BASELINE_DAY: u32 = 100;

/// Shelter population passed to the forecast and used for training
pub const DEFAULT_BASELINE_POPULATION: u32 = 50;

/// Activity level passed to the forecast
pub const DEFAULT_ACTIVITY_LEVEL: f64 = 1.0;

/// Number of synthetic training days
pub const DEFAULT_TRAINING_DAYS: u32 = 100;

/// Seed for synthetic training data
pub const DEFAULT_TRAINING_SEED: u64 = 42;

/// Forecast value sent when the model fails
pub const FORECAST_SENTINEL: f64 = -1.0;

// ============================================
// Sensor thresholds
// ============================================

/// Radiation threshold (uSv/h)
pub const RADIATION_THRESHOLD: f64 = 100.0;

/// Toxic gas threshold (ppm)
pub const TOXIC_GAS_THRESHOLD: f64 = 50.0;

/// CO2 threshold (ppm)
pub const CO2_THRESHOLD: f64 = 5000.0;

/// Minimum safe oxygen concentration (percent)
pub const OXYGEN_MIN: f64 = 19.5;

// ============================================
// Wire strings (the client matches on these)
// ============================================

pub const ALERT_NORMAL: &str = "SYSTEM NORMAL";
pub const ALERT_RADIATION: &str = "WARNING: HIGH RADIATION";
pub const ALERT_TOXIC_GAS: &str = "WARNING: TOXIC GAS";
pub const ALERT_LOW_OXYGEN: &str = "WARNING: LOW OXYGEN";

pub const ACTION_MONITORING: &str = "MONITORING";
pub const ACTION_SEAL_VENTS: &str = "ACT: SEAL VENTS";
pub const ACTION_ELECTROLYSIS: &str = "ACT: ELECTROLYSIS ON";

/// Prefix for action plans resolved through the decision table
pub const ACTION_PREFIX: &str = "ACT: ";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Shelter Life-Support Monitor";
