//! Configuration module

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::*;
use crate::error::{AppError, AppResult};
use crate::logic::sensor::AirQualityThresholds;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address (loopback by default)
    pub host: IpAddr,

    /// Bind port
    pub port: u16,

    /// Streaming tick period
    pub tick_interval: Duration,

    /// Day fed to the forecast on every tick
    pub baseline_day: u32,

    /// Population fed to the forecast and used for training
    pub baseline_population: u32,

    /// Activity level fed to the forecast
    pub activity_level: f64,

    /// Synthetic training samples
    pub training_days: u32,

    /// Training RNG seed
    pub training_seed: u64,

    /// Optional pre-fitted model file
    pub model_path: Option<PathBuf>,

    /// Sensor thresholds
    pub thresholds: AirQualityThresholds,

    /// Accept scenario commands sent by the peer
    pub peer_commands: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            baseline_day: DEFAULT_BASELINE_DAY,
            baseline_population: DEFAULT_BASELINE_POPULATION,
            activity_level: DEFAULT_ACTIVITY_LEVEL,
            training_days: DEFAULT_TRAINING_DAYS,
            training_seed: DEFAULT_TRAINING_SEED,
            model_path: None,
            thresholds: AirQualityThresholds::default(),
            peer_commands: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset keys fall back to defaults. Set but malformed keys are an error:
    /// a mistyped threshold must not silently weaken classification.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = parse_or(&lookup, "SHELTER_HOST", defaults.host)?;
        let port = parse_or(&lookup, "SHELTER_PORT", defaults.port)?;

        let tick_ms: u64 = parse_or(&lookup, "SHELTER_TICK_MS", DEFAULT_TICK_MS)?;
        if tick_ms == 0 {
            return Err(AppError::Config("SHELTER_TICK_MS must be greater than 0".to_string()));
        }

        let limits = defaults.thresholds;
        let thresholds = AirQualityThresholds {
            radiation: parse_measure_or(&lookup, "SHELTER_RADIATION_THRESHOLD", limits.radiation)?,
            toxic_gas: parse_measure_or(&lookup, "SHELTER_TOXIC_GAS_THRESHOLD", limits.toxic_gas)?,
            co2: parse_measure_or(&lookup, "SHELTER_CO2_THRESHOLD", limits.co2)?,
            oxygen_min: parse_measure_or(&lookup, "SHELTER_OXYGEN_MIN", limits.oxygen_min)?,
        };

        Ok(Self {
            host,
            port,
            tick_interval: Duration::from_millis(tick_ms),
            baseline_day: parse_or(&lookup, "SHELTER_BASELINE_DAY", defaults.baseline_day)?,
            baseline_population: parse_or(
                &lookup,
                "SHELTER_BASELINE_POPULATION",
                defaults.baseline_population,
            )?,
            activity_level: parse_measure_or(
                &lookup,
                "SHELTER_ACTIVITY_LEVEL",
                defaults.activity_level,
            )?,
            training_days: parse_or(&lookup, "SHELTER_TRAINING_DAYS", defaults.training_days)?,
            training_seed: parse_or(&lookup, "SHELTER_TRAINING_SEED", defaults.training_seed)?,
            model_path: lookup("SHELTER_MODEL_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            thresholds,
            peer_commands: lookup("SHELTER_PEER_COMMANDS")
                .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.peer_commands),
        })
    }

    /// Socket address the server binds
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has invalid value {:?}", key, raw))),
    }
}

/// Like `parse_or`, but the value must be a finite, non-negative number.
/// A NaN threshold compares false against every reading and disables its alarm.
fn parse_measure_or<F>(lookup: &F, key: &str, default: f64) -> AppResult<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let value: f64 = parse_or(lookup, key, default)?;
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Config(format!(
            "{} must be a finite non-negative number, got {}",
            key, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:65500");
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.baseline_day, 100);
        assert_eq!(config.baseline_population, 50);
        assert_eq!(config.thresholds.radiation, 100.0);
        assert_eq!(config.thresholds.oxygen_min, 19.5);
        assert!(config.model_path.is_none());
        assert!(!config.peer_commands);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SHELTER_PORT", "7000"),
            ("SHELTER_TICK_MS", "250"),
            ("SHELTER_RADIATION_THRESHOLD", "80.5"),
            ("SHELTER_MODEL_PATH", "/tmp/model.json"),
            ("SHELTER_PEER_COMMANDS", "true"),
        ]))
        .unwrap();

        assert_eq!(config.port, 7000);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.thresholds.radiation, 80.5);
        assert_eq!(config.model_path, Some(PathBuf::from("/tmp/model.json")));
        assert!(config.peer_commands);
    }

    #[test]
    fn test_malformed_value_is_error() {
        let result = Config::from_lookup(lookup_from(&[("SHELTER_OXYGEN_MIN", "low")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_non_finite_or_negative_measures_rejected() {
        let keys = [
            "SHELTER_RADIATION_THRESHOLD",
            "SHELTER_TOXIC_GAS_THRESHOLD",
            "SHELTER_CO2_THRESHOLD",
            "SHELTER_OXYGEN_MIN",
            "SHELTER_ACTIVITY_LEVEL",
        ];
        for key in keys {
            for value in ["NaN", "nan", "inf", "-inf", "infinity", "-1"] {
                let result = Config::from_lookup(lookup_from(&[(key, value)]));
                assert!(
                    matches!(result, Err(AppError::Config(_))),
                    "{}={} was accepted",
                    key,
                    value
                );
            }
        }
    }

    #[test]
    fn test_rejected_threshold_cannot_silence_alarms() {
        use crate::logic::assessment::assess;
        use crate::logic::state::{GAS_READING, RADIATION_READING};

        let nan_radiation = lookup_from(&[("SHELTER_RADIATION_THRESHOLD", "NaN")]);
        assert!(Config::from_lookup(nan_radiation).is_err());
        let inf_gas = lookup_from(&[("SHELTER_TOXIC_GAS_THRESHOLD", "inf")]);
        assert!(Config::from_lookup(inf_gas).is_err());

        // Finite overrides still classify as expected
        let config = Config::from_lookup(lookup_from(&[
            ("SHELTER_RADIATION_THRESHOLD", "250"),
            ("SHELTER_TOXIC_GAS_THRESHOLD", "0"),
        ]))
        .unwrap();
        let radiation = assess(&RADIATION_READING, &config.thresholds);
        assert_eq!(radiation.alert_message, "WARNING: HIGH RADIATION");
        let gas = assess(&GAS_READING, &config.thresholds);
        assert_eq!(gas.alert_message, "WARNING: TOXIC GAS");
    }

    #[test]
    fn test_zero_tick_rejected() {
        let result = Config::from_lookup(lookup_from(&[("SHELTER_TICK_MS", "0")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
