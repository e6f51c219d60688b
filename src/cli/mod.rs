//! Command-line surface: clap definitions and printable reports

pub mod args;
pub mod output;

pub use args::{Cli, Commands, OutputFormat};
pub use output::{print_output, TableDisplay};
