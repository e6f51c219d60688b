//! Global CPU usage

use super::{percent, MetricSource};
use crate::alerts::types::{Reading, Severity};
use crate::config::{seconds, MetricConfig};
use crate::error::CollectError;
use std::time::Duration;
use sysinfo::System;

pub struct CpuSource {
    config: MetricConfig,
    system: System,
}

impl CpuSource {
    pub fn new(config: &MetricConfig) -> Self {
        let mut system = System::new();
        // Usage is a delta between refreshes; prime the first sample
        system.refresh_cpu_usage();
        Self {
            config: config.clone(),
            system,
        }
    }

    pub(crate) fn reading(&self, usage: f64) -> Reading {
        Reading::new(
            "CPU",
            Severity::classify(usage, self.config.warning, self.config.critical),
            percent(usage),
        )
    }
}

impl MetricSource for CpuSource {
    fn name(&self) -> &str {
        "cpu"
    }

    fn debounce(&self) -> Duration {
        seconds(self.config.duration)
    }

    fn check(&mut self) -> Result<Vec<Reading>, CollectError> {
        self.system.refresh_cpu_usage();
        let usage = f64::from(self.system.global_cpu_usage());
        Ok(vec![self.reading(usage)])
    }
}
