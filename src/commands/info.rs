//! Info command implementation
//!
//! Shows the effective configuration without validating it.

use crate::cli::args::InfoArgs;
use crate::cli::output::{print_output, ConfigSummary};
use crate::config::ConfigBuilder;
use crate::error::Result;
use std::path::Path;

/// Execute the info command
pub fn run_info(args: &InfoArgs, config_path: Option<&Path>) -> Result<()> {
    let builder = ConfigBuilder::new().with_file(config_path)?;
    let source = builder.source().clone();
    let config = builder.build_unchecked();

    print_output(&ConfigSummary::new(&config, &source), args.format)?;
    Ok(())
}
