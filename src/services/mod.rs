//! Long-running services
//!
//! The monitor owns the evaluation loop and everything it mutates.

pub mod monitor;

pub use monitor::{Monitor, MonitorConfig, TickSummary};
