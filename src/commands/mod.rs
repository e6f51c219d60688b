//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod info;
pub mod run;
pub mod test_alert;
pub mod validate;

pub use info::run_info;
pub use run::run_monitor;
pub use test_alert::run_test_alert;
pub use validate::run_validate;
