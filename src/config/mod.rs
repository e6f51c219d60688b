//! Configuration system
//!
//! Handles TOML config file parsing, validation and CLI argument merging.
//! Every section is `#[serde(default)]`, so a partial file only overrides
//! what it names.

pub mod builder;
pub mod file;
pub mod validate;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::alerts::dispatcher::CooldownPolicy;
use crate::alerts::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Convert a configured number of seconds into a `Duration`
///
/// Negative values clamp to zero.
pub fn seconds(value: i64) -> Duration {
    Duration::from_secs(value.max(0) as u64)
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between ticks
    pub refresh: i64,
    /// Seconds between repeated alerts; `-1` alerts once per incident
    pub cooldown: i64,
    /// Optional log file (stderr when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub load: LoadConfig,
    pub cpu: MetricConfig,
    pub memory: MetricConfig,
    pub filesystem: FilesystemConfig,
    pub reboot: RebootConfig,
    pub io: IoConfig,
    pub alerts: AlertsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh: 2,
            cooldown: 60,
            log_file: None,
            load: LoadConfig::default(),
            cpu: MetricConfig::default(),
            memory: MetricConfig::default(),
            filesystem: FilesystemConfig::default(),
            reboot: RebootConfig::default(),
            io: IoConfig::default(),
            alerts: AlertsConfig::default(),
        }
    }
}

impl Config {
    /// Interval between ticks
    pub fn refresh_interval(&self) -> Duration {
        seconds(self.refresh).max(Duration::from_secs(1))
    }

    /// Deduplication policy selected by `cooldown`
    pub fn cooldown_policy(&self) -> CooldownPolicy {
        CooldownPolicy::from_seconds(self.cooldown)
    }
}

/// Percentage metric (CPU, memory)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    pub enabled: bool,
    pub warning: f64,
    pub critical: f64,
    /// Debounce duration in seconds
    pub duration: i64,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warning: 70.0,
            critical: 90.0,
            duration: 120,
        }
    }
}

/// Filesystem usage metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesystemConfig {
    pub enabled: bool,
    pub warning: f64,
    pub critical: f64,
    pub duration: i64,
    /// Mount points containing any of these substrings are skipped
    pub exclude: Vec<String>,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warning: 80.0,
            critical: 90.0,
            duration: 300,
            exclude: Vec::new(),
        }
    }
}

/// Load average metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub enabled: bool,
    /// Derive thresholds from the CPU count
    pub auto: bool,
    pub warning_ratio: f64,
    pub critical_ratio: f64,
    /// Absolute thresholds, used when `auto` is off
    pub warning: f64,
    pub critical: f64,
    pub duration: i64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto: true,
            warning_ratio: 0.7,
            critical_ratio: 0.9,
            warning: 0.0,
            critical: 0.0,
            duration: 180,
        }
    }
}

impl LoadConfig {
    /// Effective (warning, critical) thresholds for a machine with `cpus` CPUs
    pub fn thresholds(&self, cpus: usize) -> (f64, f64) {
        if self.auto {
            let cpus = cpus as f64;
            (cpus * self.warning_ratio, cpus * self.critical_ratio)
        } else {
            (self.warning, self.critical)
        }
    }
}

/// Pending-reboot check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebootConfig {
    pub enabled: bool,
    pub duration: i64,
}

impl Default for RebootConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: 0,
        }
    }
}

/// An I/O threshold: bytes per second, a unit string or a percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Number(f64),
    Text(String),
}

impl ThresholdValue {
    /// Resolve into bytes per second
    ///
    /// `"50M"`/`"50MB"` use binary multiples; `"80%"` is relative to
    /// `max_speed`. Anything unparseable resolves to infinity so it never
    /// triggers.
    pub fn resolve(&self, max_speed: Option<f64>) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => parse_rate(s, max_speed).unwrap_or(f64::INFINITY),
        }
    }
}

fn parse_rate(raw: &str, max_speed: Option<f64>) -> Option<f64> {
    let value = raw.trim().to_uppercase();

    if let Some(percent) = value.strip_suffix('%') {
        let percent: f64 = percent.trim().parse().ok()?;
        return max_speed.map(|max| max * percent / 100.0);
    }

    const UNITS: [(char, f64); 4] = [
        ('K', 1024.0),
        ('M', 1024.0 * 1024.0),
        ('G', 1024.0 * 1024.0 * 1024.0),
        ('T', 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ];

    let without_b = value.strip_suffix('B').unwrap_or(&value);
    for (unit, multiplier) in UNITS {
        if let Some(number) = without_b.strip_suffix(unit) {
            return number.trim().parse::<f64>().ok().map(|n| n * multiplier);
        }
    }

    value.parse().ok()
}

/// Disk I/O throughput metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<ThresholdValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical: Option<ThresholdValue>,
    /// Reference speed for percentage thresholds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<ThresholdValue>,
    pub duration: i64,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warning: None,
            critical: None,
            max_speed: None,
            duration: 120,
        }
    }
}

impl IoConfig {
    /// Effective (warning, critical) thresholds in bytes per second
    pub fn thresholds(&self) -> (f64, f64) {
        let max_speed = self
            .max_speed
            .as_ref()
            .map(|m| m.resolve(None))
            .filter(|m| m.is_finite());

        let resolve = |t: &Option<ThresholdValue>| {
            t.as_ref()
                .map(|t| t.resolve(max_speed))
                .unwrap_or(f64::INFINITY)
        };

        (resolve(&self.warning), resolve(&self.critical))
    }
}

/// Routing settings shared by every provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub enabled: bool,
    /// Severities sent for every component when `rules` is empty
    pub levels: Vec<Severity>,
    /// Canonical component key to allowed severities
    pub rules: BTreeMap<String, Vec<Severity>>,
}

/// Alerting configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Also notify when a confirmed condition returns to normal
    pub send_recovery: bool,
    pub google_chat: GoogleChatConfig,
    pub ntfy: NtfyConfig,
    pub smtp: SmtpConfig,
    pub webhook: WebhookConfig,
    pub gotify: GotifyConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleChatConfig {
    #[serde(flatten)]
    pub routing: RoutingConfig,
    pub webhook_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NtfyConfig {
    #[serde(flatten)]
    pub routing: RoutingConfig,
    pub topic_url: String,
    /// Optional bearer token
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    #[serde(flatten)]
    pub routing: RoutingConfig,
    pub host: String,
    pub port: i64,
    pub user: String,
    pub password: String,
    pub from_addr: String,
    pub to_addrs: Vec<String>,
    pub use_tls: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            routing: RoutingConfig::default(),
            host: String::new(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from_addr: String::new(),
            to_addrs: Vec::new(),
            use_tls: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    #[serde(flatten)]
    pub routing: RoutingConfig,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    /// Request timeout in seconds
    pub timeout: i64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            routing: RoutingConfig::default(),
            url: String::new(),
            headers: BTreeMap::new(),
            timeout: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GotifyConfig {
    #[serde(flatten)]
    pub routing: RoutingConfig,
    pub url: String,
    pub token: String,
}
