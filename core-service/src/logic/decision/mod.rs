//! Decision Module
//!
//! Emergency decision table: category + severity -> immediate action,
//! follow-up actions, resource estimate and priority.
//! Pure functions, no state.
//!
//! ## Structure
//! - `types`: EmergencyCategory, Severity, DecisionRecord
//! - `rules`: the static tables (actions, priorities, multipliers, base resources)
//! - `table`: classify logic
//!
//! ## Usage
//! ```ignore
//! use crate::logic::decision::classify;
//!
//! let record = classify("radiation_high", Some("high"));
//! assert_eq!(record.immediate_action, "activate_shield");
//! ```

pub mod types;
pub mod rules;
pub mod table;

pub use types::{DecisionRecord, EmergencyCategory, Severity};
pub use table::classify;
