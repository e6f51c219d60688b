//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::alerts::notifier::ProviderKind;
use crate::cli::args::OutputFormat;
use crate::config::file::ConfigSource;
use crate::config::{Config, RoutingConfig};
use crate::metrics::{format_rate, MetricKind};
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;
}

/// One metric source in the configuration summary
#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub name: String,
    pub enabled: bool,
    pub thresholds: String,
    pub duration: i64,
}

impl MetricSummary {
    fn new(kind: MetricKind, config: &Config) -> Self {
        let (thresholds, duration) = match kind {
            MetricKind::Cpu => (percent_pair(config.cpu.warning, config.cpu.critical), config.cpu.duration),
            MetricKind::Memory => (
                percent_pair(config.memory.warning, config.memory.critical),
                config.memory.duration,
            ),
            MetricKind::Filesystem => (
                percent_pair(config.filesystem.warning, config.filesystem.critical),
                config.filesystem.duration,
            ),
            MetricKind::Load => {
                let load = &config.load;
                let text = if load.auto {
                    format!(
                        "x{:.2} / x{:.2} per CPU",
                        load.warning_ratio, load.critical_ratio
                    )
                } else {
                    format!("{:.2} / {:.2}", load.warning, load.critical)
                };
                (text, load.duration)
            }
            MetricKind::Reboot => ("flag file".to_string(), config.reboot.duration),
            MetricKind::Io => {
                let (warning, critical) = config.io.thresholds();
                (format!("{} / {}", rate(warning), rate(critical)), config.io.duration)
            }
        };

        Self {
            name: kind.name().to_string(),
            enabled: kind.is_enabled(config),
            thresholds,
            duration,
        }
    }
}

fn percent_pair(warning: f64, critical: f64) -> String {
    format!("{}% / {}%", warning, critical)
}

fn rate(bytes_per_sec: f64) -> String {
    if bytes_per_sec.is_finite() {
        format_rate(bytes_per_sec)
    } else {
        "never".to_string()
    }
}

/// One provider in the configuration summary
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub name: String,
    pub enabled: bool,
    pub routing: String,
}

impl ProviderSummary {
    fn new(kind: ProviderKind, config: &Config) -> Self {
        let alerts = &config.alerts;
        let routing = match kind {
            ProviderKind::GoogleChat => &alerts.google_chat.routing,
            ProviderKind::Ntfy => &alerts.ntfy.routing,
            ProviderKind::Smtp => &alerts.smtp.routing,
            ProviderKind::Webhook => &alerts.webhook.routing,
            ProviderKind::Gotify => &alerts.gotify.routing,
        };

        Self {
            name: kind.name().to_string(),
            enabled: kind.is_enabled(alerts),
            routing: describe_routing(routing),
        }
    }
}

fn describe_routing(routing: &RoutingConfig) -> String {
    let join = |levels: &[crate::alerts::types::Severity]| {
        levels
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",")
    };

    if !routing.rules.is_empty() {
        let rules: Vec<String> = routing
            .rules
            .iter()
            .map(|(key, levels)| format!("{}={}", key, join(levels)))
            .collect();
        format!("rules: {}", rules.join("; "))
    } else if routing.levels.is_empty() {
        "levels: WARNING,CRITICAL".to_string()
    } else {
        format!("levels: {}", join(&routing.levels))
    }
}

/// Effective configuration, as shown by `info`
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub source: String,
    pub refresh: i64,
    pub cooldown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    pub send_recovery: bool,
    pub metrics: Vec<MetricSummary>,
    pub providers: Vec<ProviderSummary>,
}

impl ConfigSummary {
    pub fn new(config: &Config, source: &ConfigSource) -> Self {
        Self {
            source: source.to_string(),
            refresh: config.refresh,
            cooldown: config.cooldown_policy().to_string(),
            log_file: config.log_file.as_ref().map(|p| p.display().to_string()),
            send_recovery: config.alerts.send_recovery,
            metrics: MetricKind::ALL
                .into_iter()
                .map(|kind| MetricSummary::new(kind, config))
                .collect(),
            providers: ProviderKind::ALL
                .into_iter()
                .map(|kind| ProviderSummary::new(kind, config))
                .collect(),
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

impl TableDisplay for ConfigSummary {
    fn to_table(&self) -> String {
        let mut output = format!("Configuration: {}\n", self.source);
        output.push_str(&format!("  Refresh: {}s\n", self.refresh));
        output.push_str(&format!("  Cooldown: {}\n", self.cooldown));
        if let Some(path) = &self.log_file {
            output.push_str(&format!("  Log file: {}\n", path));
        }
        output.push_str(&format!(
            "  Recovery notifications: {}\n",
            on_off(self.send_recovery)
        ));

        output.push_str("\nMetrics:\n");
        for metric in &self.metrics {
            output.push_str(&format!(
                "  {:<11} {:<4} {:<28} duration {}s\n",
                metric.name,
                on_off(metric.enabled),
                metric.thresholds,
                metric.duration
            ));
        }

        output.push_str("\nProviders:\n");
        for provider in &self.providers {
            output.push_str(&format!(
                "  {:<11} {:<4} {}\n",
                provider.name,
                on_off(provider.enabled),
                provider.routing
            ));
        }

        output
    }
}

/// Outcome of one provider during `test-alert`
#[derive(Debug, Clone, Serialize)]
pub struct ProviderResult {
    pub provider: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Report printed by `test-alert`
#[derive(Debug, Clone, Serialize, Default)]
pub struct TestAlertReport {
    pub results: Vec<ProviderResult>,
}

impl TestAlertReport {
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.ok).count()
    }
}

impl TableDisplay for TestAlertReport {
    fn to_table(&self) -> String {
        let mut output = String::new();
        for result in &self.results {
            match &result.error {
                None => output.push_str(&format!("  [OK]     {}\n", result.provider)),
                Some(e) => output.push_str(&format!("  [FAILED] {}: {}\n", result.provider, e)),
            }
        }
        output.push_str(&format!(
            "{} of {} provider(s) delivered the test alert",
            self.results.len() - self.failed(),
            self.results.len()
        ));
        output
    }
}
