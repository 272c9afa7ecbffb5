//! Decision Types
//!
//! Core types for the decision table.
//! No logic here, only data structures and string mapping.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// EMERGENCY CATEGORY
// ============================================================================

/// Closed set of emergency categories.
///
/// `Unknown` keeps the requested tag so the default record can be traced back
/// to what was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmergencyCategory {
    RadiationHigh,
    ToxicGas,
    StructuralDamage,
    PowerFailure,
    Unknown(String),
}

impl EmergencyCategory {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "radiation_high" => EmergencyCategory::RadiationHigh,
            "toxic_gas" => EmergencyCategory::ToxicGas,
            "structural_damage" => EmergencyCategory::StructuralDamage,
            "power_failure" => EmergencyCategory::PowerFailure,
            other => EmergencyCategory::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EmergencyCategory::RadiationHigh => "radiation_high",
            EmergencyCategory::ToxicGas => "toxic_gas",
            EmergencyCategory::StructuralDamage => "structural_damage",
            EmergencyCategory::PowerFailure => "power_failure",
            EmergencyCategory::Unknown(tag) => tag,
        }
    }
}

impl std::fmt::Display for EmergencyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SEVERITY
// ============================================================================

/// Severity of an emergency.
///
/// Anything other than low/medium/high is kept as `Unrecognized`; the tables
/// give it their lookup defaults instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Unrecognized(String),
}

impl Severity {
    /// Parse a severity tag. Missing severity means high.
    pub fn parse(tag: Option<&str>) -> Self {
        match tag {
            None | Some("high") => Severity::High,
            Some("medium") => Severity::Medium,
            Some("low") => Severity::Low,
            Some(other) => Severity::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Unrecognized(tag) => tag,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// DECISION RECORD
// ============================================================================

/// Result of a classification. Built fresh every call, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Category tag ("unknown" for the default record)
    pub category: String,
    /// Severity tag as requested
    pub severity: String,
    /// Action to take right now
    pub immediate_action: String,
    /// Conditional follow-ups, in declaration order
    pub follow_up_actions: Vec<String>,
    /// Resource name -> quantity
    pub resources: BTreeMap<String, f64>,
    /// Lower = more urgent
    pub priority: u8,
    pub created_at: DateTime<Utc>,
}
