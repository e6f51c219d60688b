//! One-minute load average

use super::MetricSource;
use crate::alerts::types::{Reading, Severity};
use crate::config::{seconds, LoadConfig};
use crate::error::CollectError;
use std::time::Duration;
use sysinfo::System;

pub struct LoadSource {
    config: LoadConfig,
    cpus: usize,
}

impl LoadSource {
    pub fn new(config: &LoadConfig) -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::with_cpus(config, cpus)
    }

    pub(crate) fn with_cpus(config: &LoadConfig, cpus: usize) -> Self {
        Self {
            config: config.clone(),
            cpus,
        }
    }

    /// Effective (warning, critical) thresholds
    pub fn thresholds(&self) -> (f64, f64) {
        self.config.thresholds(self.cpus)
    }

    pub(crate) fn reading(&self, load1: f64) -> Reading {
        let (warning, critical) = self.thresholds();
        Reading::new(
            "LOAD",
            Severity::classify(load1, warning, critical),
            format!("{:.2}", load1),
        )
    }
}

impl MetricSource for LoadSource {
    fn name(&self) -> &str {
        "load"
    }

    fn debounce(&self) -> Duration {
        seconds(self.config.duration)
    }

    fn check(&mut self) -> Result<Vec<Reading>, CollectError> {
        if cfg!(windows) {
            return Err(CollectError::Unsupported("load average"));
        }
        let load = System::load_average();
        Ok(vec![self.reading(load.one)])
    }
}
