//! Configuration validation
//!
//! Every rule runs; all failures are collected.

use crate::config::Config;
use crate::error::ValidationErrors;

/// Check a configuration, returning every failure found
pub fn validate(config: &Config) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if config.refresh <= 0 {
        errors.push("refresh", "must be greater than 0");
    }
    if config.cooldown < -1 {
        errors.push("cooldown", "must be >= -1 (-1 = alert once per incident)");
    }

    if config.cpu.enabled {
        percentage_thresholds(&mut errors, "cpu", config.cpu.warning, config.cpu.critical);
    }
    if config.memory.enabled {
        percentage_thresholds(
            &mut errors,
            "memory",
            config.memory.warning,
            config.memory.critical,
        );
    }
    if config.filesystem.enabled {
        percentage_thresholds(
            &mut errors,
            "filesystem",
            config.filesystem.warning,
            config.filesystem.critical,
        );
    }

    let load = &config.load;
    if load.enabled {
        if load.auto {
            if load.warning_ratio <= 0.0 {
                errors.push("load.warning_ratio", "must be greater than 0");
            }
            if load.critical_ratio <= 0.0 {
                errors.push("load.critical_ratio", "must be greater than 0");
            }
            if load.warning_ratio >= load.critical_ratio {
                errors.push("load", "warning_ratio must be less than critical_ratio");
            }
        } else {
            if load.warning <= 0.0 {
                errors.push("load.warning", "must be greater than 0");
            }
            if load.critical <= 0.0 {
                errors.push("load.critical", "must be greater than 0");
            }
            if load.warning >= load.critical {
                errors.push("load", "warning must be less than critical");
            }
        }
    }

    let alerts = &config.alerts;
    if alerts.google_chat.routing.enabled && alerts.google_chat.webhook_url.is_empty() {
        errors.push(
            "alerts.google_chat.webhook_url",
            "required when google_chat is enabled",
        );
    }

    if alerts.ntfy.routing.enabled && alerts.ntfy.topic_url.is_empty() {
        errors.push("alerts.ntfy.topic_url", "required when ntfy is enabled");
    }

    let smtp = &alerts.smtp;
    if smtp.routing.enabled {
        required(&mut errors, "alerts.smtp.host", &smtp.host, "smtp");
        if !(1..=65535).contains(&smtp.port) {
            errors.push("alerts.smtp.port", "must be between 1 and 65535");
        }
        required(&mut errors, "alerts.smtp.user", &smtp.user, "smtp");
        required(&mut errors, "alerts.smtp.password", &smtp.password, "smtp");
        required(&mut errors, "alerts.smtp.from_addr", &smtp.from_addr, "smtp");
        if smtp.to_addrs.is_empty() {
            errors.push("alerts.smtp.to_addrs", "required when smtp is enabled");
        }
    }

    let webhook = &alerts.webhook;
    if webhook.routing.enabled {
        required(&mut errors, "alerts.webhook.url", &webhook.url, "webhook");
        if webhook.timeout <= 0 {
            errors.push("alerts.webhook.timeout", "must be greater than 0");
        }
    }

    let gotify = &alerts.gotify;
    if gotify.routing.enabled {
        required(&mut errors, "alerts.gotify.url", &gotify.url, "gotify");
        required(&mut errors, "alerts.gotify.token", &gotify.token, "gotify");
    }

    errors
}

fn required(errors: &mut ValidationErrors, field: &str, value: &str, provider: &str) {
    if value.is_empty() {
        errors.push(field, format!("required when {} is enabled", provider));
    }
}

fn percentage_thresholds(errors: &mut ValidationErrors, name: &str, warning: f64, critical: f64) {
    if !(0.0..=100.0).contains(&warning) {
        errors.push(
            format!("{}.warning", name),
            format!("must be between 0 and 100 (got {:.1})", warning),
        );
    }
    if !(0.0..=100.0).contains(&critical) {
        errors.push(
            format!("{}.critical", name),
            format!("must be between 0 and 100 (got {:.1})", critical),
        );
    }
    if warning >= critical {
        errors.push(
            name,
            format!(
                "warning ({:.1}) must be less than critical ({:.1})",
                warning, critical
            ),
        );
    }
}
