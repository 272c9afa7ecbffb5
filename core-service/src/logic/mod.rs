//! Logic Module - Monitoring, Decision & Streaming Engines
//!
//! Data flow:
//! commands -> state -> stream_loop -> analysis -> snapshot -> peer
//! (analysis = assessment + decision table + forecast)
//!
//! - `sensor/` - readings, thresholds, air-quality check
//! - `decision/` - emergency decision table
//! - `forecast/` - consumption forecast model

pub mod sensor;
pub mod decision;
pub mod forecast;

pub mod state;
pub mod commands;
pub mod assessment;
pub mod snapshot;
pub mod analysis;
pub mod stream_loop;
