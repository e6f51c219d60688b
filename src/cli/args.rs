//! CLI argument definitions using clap derive

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Lightweight host monitor with debounced, deduplicated alerts
#[derive(Parser, Debug)]
#[command(name = "tinymonitor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "TINYMONITOR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The subcommand to run; `run` when none was given
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run(RunArgs::default()))
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start monitoring (default)
    Run(RunArgs),

    /// Check the configuration and report every problem found
    Validate,

    /// Show the effective configuration
    Info(InfoArgs),

    /// Send a test alert through the enabled providers
    TestAlert(TestAlertArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the run command
#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    /// Override the refresh interval in seconds
    #[arg(long)]
    pub refresh: Option<i64>,

    /// Override the alert cooldown in seconds (-1: once per incident)
    #[arg(long, allow_hyphen_values = true)]
    pub cooldown: Option<i64>,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the test-alert command
#[derive(Parser, Debug, Clone)]
pub struct TestAlertArgs {
    /// Only test this provider (e.g. ntfy, smtp)
    #[arg(long)]
    pub provider: Option<String>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Generate shell completions
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
