//! Metric sources
//!
//! Each source reads one health dimension and classifies it. The set of
//! sources is closed and listed in [`MetricKind::ALL`].

mod cpu;
mod filesystem;
mod io;
mod load;
mod memory;
mod reboot;

pub use cpu::CpuSource;
pub use filesystem::FilesystemSource;
pub use io::{format_rate, IoSource};
pub use load::LoadSource;
pub use memory::MemorySource;
pub use reboot::RebootSource;

use crate::alerts::types::Reading;
use crate::config::Config;
use crate::error::CollectError;
use std::fmt;
use std::time::Duration;

/// A probe producing readings for one health dimension
pub trait MetricSource: Send {
    /// Source name for logs
    fn name(&self) -> &str;

    /// How long a non-OK severity must persist before alerting
    fn debounce(&self) -> Duration;

    /// Take one sample
    ///
    /// Returns every reading for this tick; an error skips the source for
    /// this tick only.
    fn check(&mut self) -> Result<Vec<Reading>, CollectError>;
}

/// Every supported metric source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Cpu,
    Memory,
    Filesystem,
    Load,
    Reboot,
    Io,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        Self::Cpu,
        Self::Memory,
        Self::Filesystem,
        Self::Load,
        Self::Reboot,
        Self::Io,
    ];

    /// Configuration section name
    pub fn name(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Filesystem => "filesystem",
            Self::Load => "load",
            Self::Reboot => "reboot",
            Self::Io => "io",
        }
    }

    pub fn is_enabled(self, config: &Config) -> bool {
        match self {
            Self::Cpu => config.cpu.enabled,
            Self::Memory => config.memory.enabled,
            Self::Filesystem => config.filesystem.enabled,
            Self::Load => config.load.enabled,
            Self::Reboot => config.reboot.enabled,
            Self::Io => config.io.enabled,
        }
    }

    pub fn build(self, config: &Config) -> Box<dyn MetricSource> {
        match self {
            Self::Cpu => Box::new(CpuSource::new(&config.cpu)),
            Self::Memory => Box::new(MemorySource::new(&config.memory)),
            Self::Filesystem => Box::new(FilesystemSource::new(&config.filesystem)),
            Self::Load => Box::new(LoadSource::new(&config.load)),
            Self::Reboot => Box::new(RebootSource::new(&config.reboot)),
            Self::Io => Box::new(IoSource::new(&config.io)),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build a source for every enabled metric
pub fn build_sources(config: &Config) -> Vec<Box<dyn MetricSource>> {
    MetricKind::ALL
        .into_iter()
        .filter(|kind| kind.is_enabled(config))
        .map(|kind| kind.build(config))
        .collect()
}

/// Format a percentage the way every percentage source reports it
pub(crate) fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_enabled_by_default() {
        let config = Config::default();
        let sources = build_sources(&config);
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["cpu", "memory", "filesystem", "load", "reboot", "io"]
        );
    }

    #[test]
    fn test_disabled_sources_skipped() {
        let mut config = Config::default();
        config.io.enabled = false;
        config.reboot.enabled = false;
        config.load.enabled = false;

        let sources = build_sources(&config);
        assert_eq!(sources.len(), 3);
        assert!(sources.iter().all(|s| s.name() != "io"));
    }

    #[test]
    fn test_debounce_from_config() {
        let mut config = Config::default();
        config.cpu.duration = 45;
        config.memory.duration = -3;

        let cpu = MetricKind::Cpu.build(&config);
        assert_eq!(cpu.debounce(), Duration::from_secs(45));
        let memory = MetricKind::Memory.build(&config);
        assert_eq!(memory.debounce(), Duration::ZERO);
        let reboot = MetricKind::Reboot.build(&config);
        assert_eq!(reboot.debounce(), Duration::ZERO);
    }

    #[test]
    fn test_percent_format() {
        assert_eq!(percent(42.0), "42.0%");
        assert_eq!(percent(81.349), "81.3%");
    }
}
