//! tinymonitor - lightweight host monitor
//!
//! Samples host health metrics on a fixed interval, debounces threshold
//! violations per component and fans deduplicated alerts out to
//! notification providers.
//!
//! # Modules
//!
//! - [`alerts`]: State tracking, dispatch, routing and providers
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`error`]: Error types
//! - [`host`]: Machine context attached to notifications
//! - [`logging`]: Logger setup and per-component log handles
//! - [`metrics`]: Metric sources
//! - [`services`]: The evaluation loop

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod metrics;
pub mod services;

#[cfg(test)]
pub mod mock;

pub use error::{AppError, Result};
