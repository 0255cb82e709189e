//! Real-time therapeutic monitoring state
//!
//! A pure reducer over telemetry pushed from the backend monitoring
//! service: bounded rolling histories, derived alerts, and alert/settings
//! lifecycle commands. No I/O happens here; the transport subscription
//! lives in the runtime.

pub mod store;
pub mod types;

#[cfg(test)]
mod proptests;

pub use store::{MonitorCommand, MonitoringStore, SettingsError};
pub use types::*;
