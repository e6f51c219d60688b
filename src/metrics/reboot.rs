//! Pending-reboot flag (Debian/Ubuntu style)

use super::MetricSource;
use crate::alerts::types::{Reading, Severity};
use crate::config::{seconds, RebootConfig};
use crate::error::CollectError;
use std::path::PathBuf;
use std::time::Duration;

const FLAG_FILES: [&str; 2] = ["/var/run/reboot-required", "/run/reboot-required"];

pub struct RebootSource {
    config: RebootConfig,
    flag_files: Vec<PathBuf>,
}

impl RebootSource {
    pub fn new(config: &RebootConfig) -> Self {
        Self::with_flag_files(config, FLAG_FILES.iter().map(PathBuf::from).collect())
    }

    pub(crate) fn with_flag_files(config: &RebootConfig, flag_files: Vec<PathBuf>) -> Self {
        Self {
            config: config.clone(),
            flag_files,
        }
    }
}

impl MetricSource for RebootSource {
    fn name(&self) -> &str {
        "reboot"
    }

    fn debounce(&self) -> Duration {
        seconds(self.config.duration)
    }

    fn check(&mut self) -> Result<Vec<Reading>, CollectError> {
        let reading = if self.flag_files.iter().any(|p| p.exists()) {
            Reading::new(
                "REBOOT",
                Some(Severity::Warning),
                "System requires a reboot (updates installed)",
            )
        } else {
            Reading::ok("REBOOT", "OK")
        };
        Ok(vec![reading])
    }
}
