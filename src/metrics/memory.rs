//! Memory usage

use super::{percent, MetricSource};
use crate::alerts::types::{Reading, Severity};
use crate::config::{seconds, MetricConfig};
use crate::error::CollectError;
use std::time::Duration;
use sysinfo::System;

pub struct MemorySource {
    config: MetricConfig,
    system: System,
}

impl MemorySource {
    pub fn new(config: &MetricConfig) -> Self {
        Self {
            config: config.clone(),
            system: System::new(),
        }
    }

    pub(crate) fn reading(&self, used_percent: f64) -> Reading {
        Reading::new(
            "MEMORY",
            Severity::classify(used_percent, self.config.warning, self.config.critical),
            percent(used_percent),
        )
    }
}

/// Used share of memory, counting reclaimable memory as free
pub(crate) fn used_percent(total: u64, available: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let used = total.saturating_sub(available);
    Some(used as f64 / total as f64 * 100.0)
}

impl MetricSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn debounce(&self) -> Duration {
        seconds(self.config.duration)
    }

    fn check(&mut self) -> Result<Vec<Reading>, CollectError> {
        self.system.refresh_memory();
        let used = used_percent(self.system.total_memory(), self.system.available_memory())
            .ok_or(CollectError::Unsupported("memory statistics"))?;
        Ok(vec![self.reading(used)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_percent() {
        assert_eq!(used_percent(1000, 250), Some(75.0));
        assert_eq!(used_percent(1000, 1000), Some(0.0));
        assert_eq!(used_percent(1000, 2000), Some(0.0));
        assert_eq!(used_percent(0, 0), None);
    }

    #[test]
    fn test_classification() {
        let source = MemorySource::new(&MetricConfig {
            warning: 60.0,
            critical: 80.0,
            ..MetricConfig::default()
        });

        assert_eq!(source.reading(59.9).severity, None);
        assert_eq!(source.reading(60.0).severity, Some(Severity::Warning));
        assert_eq!(
            source.reading(85.0),
            Reading::new("MEMORY", Some(Severity::Critical), "85.0%")
        );
    }
}
