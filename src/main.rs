//! tinymonitor - lightweight host monitor
//!
//! Watches CPU, memory, disks, load, I/O and pending reboots, and alerts
//! through chat, push, email and webhook providers.

use clap::Parser;
use tinymonitor::cli::args::{generate_completions, Cli, Commands};
use tinymonitor::commands::{run_info, run_monitor, run_test_alert, run_validate};
use tinymonitor::error::{AppError, ConfigError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    let config = cli.config.as_deref();

    match cli.command_or_default() {
        // `run` initializes logging itself once `log_file` is known
        Commands::Run(args) => run_monitor(&args, config, cli.verbose).await,

        Commands::Validate => run_validate(config),

        Commands::Info(args) => run_info(&args, config),

        Commands::TestAlert(args) => run_test_alert(&args, config, cli.verbose).await,

        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Config(ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Without --config, tinymonitor looks for ./config.toml,");
            eprintln!("      ~/.config/tinymonitor/config.toml and /etc/tinymonitor/config.toml.");
        }
        AppError::NoProviders => {
            eprintln!();
            eprintln!("Hint: Set `enabled = true` in at least one [alerts.<provider>] table.");
        }
        AppError::ProviderNotFound(_) => {
            eprintln!();
            eprintln!("Hint: Available providers: google_chat, ntfy, smtp, webhook, gotify");
        }
        _ => {}
    }
}
