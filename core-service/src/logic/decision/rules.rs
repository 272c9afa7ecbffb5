//! Decision Rules & Tables
//!
//! Static tables for the decision table.
//! No classify logic here, only constants and lookups.

use super::types::{EmergencyCategory, Severity};

// ============================================================================
// CATEGORY RULES
// ============================================================================

/// Static description of one emergency category
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    /// Immediate action
    pub action: &'static str,
    /// Conditional sub-decisions: (condition, outcome), in declaration order
    pub sub_decisions: [(&'static str, &'static str); 2],
    /// Resources at medium severity (multiplier 1.0)
    pub base_resources: &'static [(&'static str, f64)],
}

pub const RADIATION_HIGH: CategoryRule = CategoryRule {
    action: "activate_shield",
    sub_decisions: [
        ("shield_active", "monitor_levels"),
        ("shield_failed", "evacuate_to_inner_chamber"),
    ],
    base_resources: &[("energy", 50.0), ("manpower", 2.0)],
};

pub const TOXIC_GAS: CategoryRule = CategoryRule {
    action: "seal_ventilation",
    sub_decisions: [
        ("seal_successful", "activate_filters"),
        ("seal_failed", "deploy_emergency_masks"),
    ],
    base_resources: &[("filters", 3.0), ("energy", 20.0)],
};

pub const STRUCTURAL_DAMAGE: CategoryRule = CategoryRule {
    action: "assess_damage",
    sub_decisions: [
        ("minor", "repair_immediately"),
        ("major", "evacuate_section"),
    ],
    base_resources: &[("materials", 100.0), ("manpower", 5.0)],
};

pub const POWER_FAILURE: CategoryRule = CategoryRule {
    action: "switch_to_backup",
    sub_decisions: [
        ("backup_online", "diagnose_main"),
        ("backup_failed", "activate_manual_generators"),
    ],
    base_resources: &[("backup_fuel", 200.0), ("manpower", 3.0)],
};

/// Rule for a category. `None` only for `Unknown`.
pub fn rule_for(category: &EmergencyCategory) -> Option<&'static CategoryRule> {
    match category {
        EmergencyCategory::RadiationHigh => Some(&RADIATION_HIGH),
        EmergencyCategory::ToxicGas => Some(&TOXIC_GAS),
        EmergencyCategory::StructuralDamage => Some(&STRUCTURAL_DAMAGE),
        EmergencyCategory::PowerFailure => Some(&POWER_FAILURE),
        EmergencyCategory::Unknown(_) => None,
    }
}

// ============================================================================
// SEVERITY TABLES
// ============================================================================

/// Priority by severity (independent of category). Unrecognized = 3.
pub fn priority_for(severity: &Severity) -> u8 {
    match severity {
        Severity::High => 1,
        Severity::Medium => 2,
        Severity::Low | Severity::Unrecognized(_) => 3,
    }
}

/// Resource multiplier by severity. Unrecognized = 1.0.
pub fn resource_multiplier(severity: &Severity) -> f64 {
    match severity {
        Severity::Low => 0.5,
        Severity::Medium | Severity::Unrecognized(_) => 1.0,
        Severity::High => 2.0,
    }
}

// ============================================================================
// DEFAULT RESPONSE (unknown category)
// ============================================================================

pub const DEFAULT_CATEGORY: &str = "unknown";
pub const DEFAULT_ACTION: &str = "initiate_general_emergency_protocol";
pub const DEFAULT_FOLLOW_UPS: [&str; 2] = ["seal_all_doors", "activate_backup_systems"];
pub const DEFAULT_PRIORITY: u8 = 1;
/// Fixed, not scaled by severity
pub const DEFAULT_RESOURCES: [(&str, f64); 2] = [("energy", 100.0), ("manpower", 5.0)];
