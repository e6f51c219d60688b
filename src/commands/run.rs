//! Run command implementation
//!
//! Loads and validates the configuration, then runs the monitor until
//! interrupted.

use crate::cli::args::RunArgs;
use crate::config::ConfigBuilder;
use crate::error::Result;
use crate::logging::{self, LogHandle};
use crate::services::Monitor;
use std::path::Path;

/// Execute the run command
pub async fn run_monitor(args: &RunArgs, config_path: Option<&Path>, verbose: bool) -> Result<()> {
    let builder = ConfigBuilder::new()
        .with_file(config_path)?
        .with_refresh(args.refresh)
        .with_cooldown(args.cooldown);
    let source = builder.source().clone();
    let config = builder.build()?;

    // Logging waits for the config so `log_file` applies from the first line
    logging::init(verbose, config.log_file.as_deref());
    let log = LogHandle::root();
    log::info!(target: log.target(), "Loaded configuration from {}", source);

    Monitor::from_config(&config, log).run().await
}
