//! Decision Table
//!
//! Only the classify logic. Input: category + severity tags. Output: DecisionRecord.
//! Total function: unknown categories and malformed severities never fail.

use chrono::Utc;

use super::rules::{
    priority_for, resource_multiplier, rule_for, DEFAULT_ACTION, DEFAULT_CATEGORY,
    DEFAULT_FOLLOW_UPS, DEFAULT_PRIORITY, DEFAULT_RESOURCES,
};
use super::types::{DecisionRecord, EmergencyCategory, Severity};

/// Classify an emergency from raw tags. A missing severity means high.
pub fn classify(category: &str, severity: Option<&str>) -> DecisionRecord {
    decide(&EmergencyCategory::parse(category), &Severity::parse(severity))
}

/// Classify parsed tags.
///
/// Follow-up actions are only attached when severity is exactly `High`.
pub fn decide(category: &EmergencyCategory, severity: &Severity) -> DecisionRecord {
    let is_high = *severity == Severity::High;

    let Some(rule) = rule_for(category) else {
        return default_record(severity, is_high);
    };

    let follow_up_actions = if is_high {
        rule.sub_decisions
            .iter()
            .map(|(_, outcome)| outcome.to_string())
            .collect()
    } else {
        Vec::new()
    };

    let multiplier = resource_multiplier(severity);
    let resources = rule
        .base_resources
        .iter()
        .map(|(name, qty)| (name.to_string(), qty * multiplier))
        .collect();

    DecisionRecord {
        category: category.as_str().to_string(),
        severity: severity.as_str().to_string(),
        immediate_action: rule.action.to_string(),
        follow_up_actions,
        resources,
        priority: priority_for(severity),
        created_at: Utc::now(),
    }
}

fn default_record(severity: &Severity, is_high: bool) -> DecisionRecord {
    // High-only, like every defined category: follow-ups are non-empty iff severity is high
    let follow_up_actions = if is_high {
        DEFAULT_FOLLOW_UPS.iter().map(|s| s.to_string()).collect()
    } else {
        Vec::new()
    };

    DecisionRecord {
        category: DEFAULT_CATEGORY.to_string(),
        severity: severity.as_str().to_string(),
        immediate_action: DEFAULT_ACTION.to_string(),
        follow_up_actions,
        resources: DEFAULT_RESOURCES
            .iter()
            .map(|(name, qty)| (name.to_string(), *qty))
            .collect(),
        priority: DEFAULT_PRIORITY,
        created_at: Utc::now(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const KNOWN: [EmergencyCategory; 4] = [
        EmergencyCategory::RadiationHigh,
        EmergencyCategory::ToxicGas,
        EmergencyCategory::StructuralDamage,
        EmergencyCategory::PowerFailure,
    ];

    #[test]
    fn test_radiation_high() {
        let record = classify("radiation_high", Some("high"));
        assert_eq!(record.category, "radiation_high");
        assert_eq!(record.immediate_action, "activate_shield");
        assert_eq!(record.priority, 1);
        assert_eq!(
            record.follow_up_actions,
            vec!["monitor_levels", "evacuate_to_inner_chamber"]
        );
        assert_eq!(record.resources["energy"], 100.0);
        assert_eq!(record.resources["manpower"], 4.0);
    }

    #[test]
    fn test_missing_severity_means_high() {
        let record = classify("power_failure", None);
        assert_eq!(record.severity, "high");
        assert_eq!(record.priority, 1);
        assert_eq!(record.resources["backup_fuel"], 400.0);
        assert_eq!(record.follow_up_actions.len(), 2);
    }

    #[test]
    fn test_priority_and_multiplier_per_severity() {
        let cases = [("low", 3u8, 0.5), ("medium", 2, 1.0), ("high", 1, 2.0)];

        for category in KNOWN {
            let base = rule_for(&category).unwrap().base_resources;
            for (severity, priority, multiplier) in cases {
                let record = decide(&category, &Severity::parse(Some(severity)));
                assert_eq!(record.priority, priority, "{} {}", category, severity);
                assert_eq!(record.resources.len(), base.len());
                for (name, qty) in base {
                    assert_eq!(record.resources[*name], qty * multiplier);
                }
            }
        }
    }

    #[test]
    fn test_toxic_gas_medium_has_no_follow_ups() {
        let record = classify("toxic_gas", Some("medium"));
        assert_eq!(record.immediate_action, "seal_ventilation");
        assert!(record.follow_up_actions.is_empty());
        assert_eq!(record.resources["filters"], 3.0);
        assert_eq!(record.resources["energy"], 20.0);
    }

    #[test]
    fn test_malformed_severity_uses_table_defaults() {
        let record = classify("structural_damage", Some("catastrophic"));
        assert_eq!(record.severity, "catastrophic");
        assert_eq!(record.immediate_action, "assess_damage");
        assert_eq!(record.priority, 3);
        assert_eq!(record.resources["materials"], 100.0);
        assert_eq!(record.resources["manpower"], 5.0);
        assert!(record.follow_up_actions.is_empty());
    }

    #[test]
    fn test_severity_is_case_sensitive() {
        let record = classify("radiation_high", Some("HIGH"));
        assert_eq!(record.priority, 3);
        assert!(record.follow_up_actions.is_empty());
    }

    #[test]
    fn test_unknown_category_default_record() {
        let record = classify("meteor_strike", Some("high"));
        assert_eq!(record.category, "unknown");
        assert_eq!(record.immediate_action, "initiate_general_emergency_protocol");
        assert_eq!(
            record.follow_up_actions,
            vec!["seal_all_doors", "activate_backup_systems"]
        );
        assert_eq!(record.priority, 1);
        assert_eq!(record.resources["energy"], 100.0);
        assert_eq!(record.resources["manpower"], 5.0);
    }

    #[test]
    fn test_unknown_category_resources_not_scaled() {
        let low = classify("flood", Some("low"));
        assert_eq!(low.priority, 1);
        assert_eq!(low.resources["energy"], 100.0);
        assert!(low.follow_up_actions.is_empty());
    }

    fn any_severity() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("low".to_string())),
            Just(Some("medium".to_string())),
            Just(Some("high".to_string())),
            "[a-zA-Z]{0,10}".prop_map(Some),
        ]
    }

    fn any_category() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("radiation_high".to_string()),
            Just("toxic_gas".to_string()),
            Just("structural_damage".to_string()),
            Just("power_failure".to_string()),
            "[a-z_]{0,16}",
        ]
    }

    proptest! {
        #[test]
        fn prop_follow_ups_iff_high(category in any_category(), severity in any_severity()) {
            let record = classify(&category, severity.as_deref());
            let is_high = matches!(severity.as_deref(), None | Some("high"));
            prop_assert_eq!(!record.follow_up_actions.is_empty(), is_high);
        }

        #[test]
        fn prop_resources_non_negative(category in any_category(), severity in any_severity()) {
            let record = classify(&category, severity.as_deref());
            prop_assert!(record.resources.values().all(|q| *q >= 0.0));
            prop_assert!((1..=3).contains(&record.priority));
        }
    }
}
