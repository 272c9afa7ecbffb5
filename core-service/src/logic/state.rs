//! Environmental State
//!
//! The (reading, emergency level, running) triple lives in ONE value behind
//! ONE lock. Readers copy the whole triple out; there is no way to read a
//! single field, so a tick can never see fields from two different commands.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use crate::logic::sensor::EnvironmentalReading;

// ============================================================================
// EMERGENCY LEVEL
// ============================================================================

/// Ordinal emergency scale. Derived from the scenario, never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EmergencyLevel {
    Normal = 1,
    Warning = 2,
    Critical = 3,
}

impl EmergencyLevel {
    /// Numeric level fed to the forecast model
    pub fn as_factor(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmergencyLevel::Normal => "normal",
            EmergencyLevel::Warning => "warning",
            EmergencyLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for EmergencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SCENARIO COMMAND
// ============================================================================

/// Operator scenario command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioCommand {
    Normal,
    Radiation,
    Gas,
    Oxygen,
    Quit,
}

pub const NORMAL_READING: EnvironmentalReading =
    EnvironmentalReading::new(10.0, 0.0, 400.0, 21.0);
pub const RADIATION_READING: EnvironmentalReading =
    EnvironmentalReading::new(500.0, 0.0, 400.0, 21.0);
pub const GAS_READING: EnvironmentalReading =
    EnvironmentalReading::new(10.0, 200.0, 400.0, 21.0);
pub const OXYGEN_READING: EnvironmentalReading =
    EnvironmentalReading::new(10.0, 0.0, 400.0, 15.0);

impl ScenarioCommand {
    /// Parse a single-character token (surrounding whitespace and case ignored)
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "n" => Some(ScenarioCommand::Normal),
            "r" => Some(ScenarioCommand::Radiation),
            "g" => Some(ScenarioCommand::Gas),
            "o" => Some(ScenarioCommand::Oxygen),
            "q" => Some(ScenarioCommand::Quit),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            ScenarioCommand::Normal => "n",
            ScenarioCommand::Radiation => "r",
            ScenarioCommand::Gas => "g",
            ScenarioCommand::Oxygen => "o",
            ScenarioCommand::Quit => "q",
        }
    }

    /// Reading and level this scenario sets. `None` for Quit.
    pub fn scenario(&self) -> Option<(EnvironmentalReading, EmergencyLevel)> {
        match self {
            ScenarioCommand::Normal => Some((NORMAL_READING, EmergencyLevel::Normal)),
            ScenarioCommand::Radiation => Some((RADIATION_READING, EmergencyLevel::Critical)),
            ScenarioCommand::Gas => Some((GAS_READING, EmergencyLevel::Warning)),
            ScenarioCommand::Oxygen => Some((OXYGEN_READING, EmergencyLevel::Warning)),
            ScenarioCommand::Quit => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScenarioCommand::Normal => "All systems normal",
            ScenarioCommand::Radiation => "High radiation crisis",
            ScenarioCommand::Gas => "Toxic gas leak",
            ScenarioCommand::Oxygen => "Severe oxygen shortage",
            ScenarioCommand::Quit => "Quit",
        }
    }
}

impl std::fmt::Display for ScenarioCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

// ============================================================================
// HABITAT STATE
// ============================================================================

/// Full state triple, plus the scenario that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HabitatState {
    pub reading: EnvironmentalReading,
    pub level: EmergencyLevel,
    /// Scenario that set the reading (never Quit)
    pub scenario: ScenarioCommand,
    pub running: bool,
}

impl Default for HabitatState {
    fn default() -> Self {
        Self {
            reading: NORMAL_READING,
            level: EmergencyLevel::Normal,
            scenario: ScenarioCommand::Normal,
            running: true,
        }
    }
}

impl HabitatState {
    /// State after applying a command. Quit keeps the reading and stops.
    pub fn with_command(&self, command: ScenarioCommand) -> Self {
        match command.scenario() {
            Some((reading, level)) => Self {
                reading,
                level,
                scenario: command,
                running: self.running,
            },
            None => Self {
                running: false,
                ..*self
            },
        }
    }
}

/// Shared handle to the habitat state, starting from the normal scenario.
/// Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<HabitatState>>,
    stopped: Arc<Notify>,
}

impl SharedState {
    /// Copy of the whole triple
    pub fn snapshot(&self) -> HabitatState {
        *self.inner.read()
    }

    /// Apply a command as one atomic replace. Returns the new state.
    pub fn apply(&self, command: ScenarioCommand) -> HabitatState {
        let (before, after) = {
            let mut guard = self.inner.write();
            let before = *guard;
            *guard = guard.with_command(command);
            (before, *guard)
        };

        if before.running && !after.running {
            self.stopped.notify_waiters();
        }
        after
    }

    /// Request a cooperative stop (same as Quit)
    pub fn stop(&self) {
        self.apply(ScenarioCommand::Quit);
    }

    pub fn is_running(&self) -> bool {
        self.inner.read().running
    }

    /// Resolves once the running flag is down
    pub async fn wait_stopped(&self) {
        loop {
            // Registered before the check, so a stop in between is not missed
            let notified = self.stopped.notified();
            if !self.is_running() {
                return;
            }
            notified.await;
        }
    }
}
