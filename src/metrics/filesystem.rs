//! Filesystem usage per mount point

use super::{percent, MetricSource};
use crate::alerts::types::{Reading, Severity};
use crate::config::{seconds, FilesystemConfig};
use crate::error::CollectError;
use std::time::Duration;
use sysinfo::Disks;

pub struct FilesystemSource {
    config: FilesystemConfig,
}

/// What the filter needs to know about a mounted filesystem
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Mount {
    pub device: String,
    pub fs_type: String,
    pub mount_point: String,
    pub total: u64,
    pub available: u64,
}

impl FilesystemSource {
    pub fn new(config: &FilesystemConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Whether a mount is worth reporting
    ///
    /// Skips loop devices, squashfs, overlay and docker mounts, pseudo
    /// filesystems without a type, and user excludes.
    pub(crate) fn is_monitored(&self, mount: &Mount) -> bool {
        if mount.device.contains("loop") || mount.fs_type == "squashfs" {
            return false;
        }
        if mount.mount_point.contains("docker") || mount.fs_type == "overlay" {
            return false;
        }
        if mount.fs_type.is_empty() || mount.total == 0 {
            return false;
        }
        !self
            .config
            .exclude
            .iter()
            .any(|ex| mount.mount_point.contains(ex.as_str()))
    }

    pub(crate) fn readings(&self, mounts: &[Mount]) -> Vec<Reading> {
        mounts
            .iter()
            .filter(|m| self.is_monitored(m))
            .map(|m| {
                let used = m.total.saturating_sub(m.available) as f64 / m.total as f64 * 100.0;
                Reading::new(
                    format!("DISK:{}", m.mount_point),
                    Severity::classify(used, self.config.warning, self.config.critical),
                    percent(used),
                )
            })
            .collect()
    }
}

impl MetricSource for FilesystemSource {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn debounce(&self) -> Duration {
        seconds(self.config.duration)
    }

    fn check(&mut self) -> Result<Vec<Reading>, CollectError> {
        let disks = Disks::new_with_refreshed_list();
        let mounts: Vec<Mount> = disks
            .list()
            .iter()
            .map(|d| Mount {
                device: d.name().to_string_lossy().into_owned(),
                fs_type: d.file_system().to_string_lossy().into_owned(),
                mount_point: d.mount_point().display().to_string(),
                total: d.total_space(),
                available: d.available_space(),
            })
            .collect();

        Ok(self.readings(&mounts))
    }
}
