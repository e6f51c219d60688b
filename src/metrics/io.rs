//! Disk I/O throughput from `/proc/diskstats`
//!
//! Rates are deltas between two checks, so the first check only records
//! counters and reports nothing.

use super::MetricSource;
use crate::alerts::types::{Reading, Severity};
use crate::config::{seconds, IoConfig};
use crate::error::CollectError;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const SECTOR_SIZE: u64 = 512;

/// Cumulative bytes read and written by whole disks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct IoCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

pub struct IoSource {
    config: IoConfig,
    diskstats: PathBuf,
    sys_block: PathBuf,
    last: Option<(IoCounters, Instant)>,
}

impl IoSource {
    pub fn new(config: &IoConfig) -> Self {
        Self::with_paths(config, "/proc/diskstats", "/sys/block")
    }

    pub(crate) fn with_paths(
        config: &IoConfig,
        diskstats: impl Into<PathBuf>,
        sys_block: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config: config.clone(),
            diskstats: diskstats.into(),
            sys_block: sys_block.into(),
            last: None,
        }
    }

    fn read_counters(&self) -> Result<IoCounters, CollectError> {
        let content = std::fs::read_to_string(&self.diskstats)?;
        parse_diskstats(&content, |name| is_whole_disk(&self.sys_block, name))
    }

    /// Classify read + write throughput in bytes per second
    pub(crate) fn reading(&self, read_rate: f64, write_rate: f64) -> Reading {
        let (warning, critical) = self.config.thresholds();
        Reading::new(
            "I/O",
            Severity::classify(read_rate + write_rate, warning, critical),
            format!("R: {} W: {}", format_rate(read_rate), format_rate(write_rate)),
        )
    }

    pub(crate) fn sample(&mut self, counters: IoCounters, now: Instant) -> Option<Reading> {
        let previous = self.last.replace((counters, now));
        let (before, then) = previous?;

        let elapsed = now.saturating_duration_since(then).as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }

        let read = counters.read_bytes.saturating_sub(before.read_bytes) as f64 / elapsed;
        let write = counters.write_bytes.saturating_sub(before.write_bytes) as f64 / elapsed;
        Some(self.reading(read, write))
    }
}

/// Whole disks have an entry in `/sys/block`; partitions do not
fn is_whole_disk(sys_block: &Path, name: &str) -> bool {
    sys_block.join(name.replace('/', "!")).exists()
}

pub(crate) fn parse_diskstats(
    content: &str,
    include: impl Fn(&str) -> bool,
) -> Result<IoCounters, CollectError> {
    let mut total = IoCounters::default();

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        if !include(fields[2]) {
            continue;
        }

        let sectors = |i: usize| {
            fields[i].parse::<u64>().map_err(|e| CollectError::Parse {
                source_name: "/proc/diskstats",
                message: format!("{}: {}", fields[2], e),
            })
        };

        total.read_bytes += sectors(5)? * SECTOR_SIZE;
        total.write_bytes += sectors(9)? * SECTOR_SIZE;
    }

    Ok(total)
}

/// Human-readable rate, e.g. `1.5MB/s`
pub fn format_rate(bytes_per_sec: f64) -> String {
    const LABELS: [&str; 5] = ["", "K", "M", "G", "T"];
    let mut size = bytes_per_sec;
    let mut unit = 0;

    while size > 1024.0 && unit < LABELS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1}{}B/s", size, LABELS[unit])
}

impl MetricSource for IoSource {
    fn name(&self) -> &str {
        "io"
    }

    fn debounce(&self) -> Duration {
        seconds(self.config.duration)
    }

    fn check(&mut self) -> Result<Vec<Reading>, CollectError> {
        let counters = self.read_counters()?;
        Ok(self.sample(counters, Instant::now()).into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdValue;

    const DISKSTATS: &str = "\
   8       0 sda 1000 10 2048 500 2000 20 4096 800 0 900 1300 0 0 0 0
   8       1 sda1 900 10 2000 450 1900 20 4000 750 0 850 1200 0 0 0 0
 259       0 nvme0n1 10 0 100 1 20 0 200 2 0 3 3 0 0 0 0
   7       0 loop0 5 0 10 0 0 0 0 0 0 0 0 0 0 0 0
";

    #[test]
    fn test_parse_whole_disks_only() {
        let counters =
            parse_diskstats(DISKSTATS, |name| name == "sda" || name == "nvme0n1").unwrap();
        assert_eq!(counters.read_bytes, (2048 + 100) * 512);
        assert_eq!(counters.write_bytes, (4096 + 200) * 512);
    }

    #[test]
    fn test_parse_error() {
        let result = parse_diskstats("8 0 sda 1 2 x 4 5 6 7 8", |_| true);
        assert!(matches!(result, Err(CollectError::Parse { .. })));
    }

    #[test]
    fn test_sys_block_lookup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sda")).unwrap();
        std::fs::create_dir(dir.path().join("cciss!c0d0")).unwrap();

        assert!(is_whole_disk(dir.path(), "sda"));
        assert!(is_whole_disk(dir.path(), "cciss/c0d0"));
        assert!(!is_whole_disk(dir.path(), "sda1"));
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0), "0.0B/s");
        assert_eq!(format_rate(1024.0), "1024.0B/s");
        assert_eq!(format_rate(3.0 * 1024.0), "3.0KB/s");
        assert_eq!(format_rate(1.5 * 1024.0 * 1024.0), "1.5MB/s");
        assert_eq!(format_rate(2.0 * 1024.0 * 1024.0 * 1024.0), "2.0GB/s");
    }

    #[test]
    fn test_first_sample_primes() {
        let mut source = IoSource::new(&IoConfig::default());
        let start = Instant::now();
        let counters = IoCounters {
            read_bytes: 0,
            write_bytes: 0,
        };
        assert!(source.sample(counters, start).is_none());

        let later = IoCounters {
            read_bytes: 3 * 1024 * 1024,
            write_bytes: 4 * 1024,
        };
        let reading = source.sample(later, start + Duration::from_secs(2)).unwrap();
        assert_eq!(reading.component, "I/O");
        assert_eq!(reading.value, "R: 1.5MB/s W: 2.0KB/s");
        // No thresholds configured: never triggers
        assert_eq!(reading.severity, None);
    }

    #[test]
    fn test_thresholds_applied_to_total_rate() {
        let config = IoConfig {
            warning: Some(ThresholdValue::Text("1M".into())),
            critical: Some(ThresholdValue::Text("10M".into())),
            ..IoConfig::default()
        };
        let source = IoSource::new(&config);
        let mb = 1024.0 * 1024.0;

        assert_eq!(source.reading(0.5 * mb, 0.4 * mb).severity, None);
        assert_eq!(source.reading(0.5 * mb, 0.5 * mb).severity, Some(Severity::Warning));
        assert_eq!(source.reading(8.0 * mb, 3.0 * mb).severity, Some(Severity::Critical));
    }

    #[test]
    fn test_check_with_fixture_files() {
        let dir = tempfile::tempdir().unwrap();
        let stats = dir.path().join("diskstats");
        let block = dir.path().join("block");
        std::fs::create_dir_all(block.join("sda")).unwrap();
        std::fs::write(&stats, DISKSTATS).unwrap();

        let mut source = IoSource::with_paths(&IoConfig::default(), &stats, &block);
        assert!(source.check().unwrap().is_empty());
        assert!(source.check().unwrap().len() <= 1);
    }

    #[test]
    fn test_missing_diskstats_is_a_collection_fault() {
        let mut source =
            IoSource::with_paths(&IoConfig::default(), "/nonexistent/diskstats", "/nonexistent");
        assert!(matches!(source.check(), Err(CollectError::Io(_))));
    }
}
