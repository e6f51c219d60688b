//! Logging setup
//!
//! `env_logger` is the backend. Components do not log under a shared
//! module-level name; each one is handed a [`LogHandle`] when it is built
//! and logs through `log::*!(target: handle.target(), ...)`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

/// Root log target for the whole application
pub const ROOT_TARGET: &str = "tinymonitor";

/// Cloneable logging handle carrying the target a component logs under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogHandle {
    target: Arc<str>,
}

impl LogHandle {
    /// Create a handle for an explicit target
    pub fn new(target: impl AsRef<str>) -> Self {
        Self {
            target: Arc::from(target.as_ref()),
        }
    }

    /// Handle for the application root target
    pub fn root() -> Self {
        Self::new(ROOT_TARGET)
    }

    /// Derive a handle for a sub-component (`parent::name`)
    pub fn child(&self, name: &str) -> Self {
        Self::new(format!("{}::{}", self.target, name))
    }

    /// The log target string
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Default for LogHandle {
    fn default() -> Self {
        Self::root()
    }
}

/// Initialize the global logger backend
///
/// Honors `RUST_LOG`; falls back to `info` (or `debug` when verbose). When
/// `log_file` is set, output is appended to that file instead of stderr.
pub fn init(verbose: bool, log_file: Option<&Path>) {
    let default_level = if verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!(
                    "Warning: could not open log file {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    // A second init (tests, repeated commands) is harmless
    let _ = builder.try_init();

    if verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_handle() {
        assert_eq!(LogHandle::root().target(), "tinymonitor");
    }

    #[test]
    fn test_child_handle() {
        let handle = LogHandle::root().child("dispatcher").child("pool");
        assert_eq!(handle.target(), "tinymonitor::dispatcher::pool");
    }
}
