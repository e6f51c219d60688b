//! Test-alert command implementation
//!
//! Sends a synthetic WARNING through each enabled provider, bypassing
//! routing, cooldown and the worker pool, and reports the outcome of each.

use crate::alerts::notifier::{Notifier, ProviderKind};
use crate::alerts::types::{Notification, Severity};
use crate::cli::args::{OutputFormat, TestAlertArgs};
use crate::cli::output::{print_output, ProviderResult, TestAlertReport};
use crate::config::{AlertsConfig, ConfigBuilder};
use crate::error::{AppError, Result};
use crate::host;
use crate::logging::{self, LogHandle};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

/// Execute the test-alert command
pub async fn run_test_alert(
    args: &TestAlertArgs,
    config_path: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let config = ConfigBuilder::new().with_file(config_path)?.build()?;
    logging::init(verbose, None);
    let log = LogHandle::root().child("test_alert");

    let kinds = select_providers(&config.alerts, args.provider.as_deref())?;

    println!("Sending test alert to {} provider(s)...", kinds.len());

    let mut report = TestAlertReport::default();
    let mut notifiers = Vec::new();
    for kind in kinds {
        match kind.build(&config.alerts, &log) {
            Ok(notifier) => notifiers.push(notifier),
            Err(e) => report.results.push(ProviderResult {
                provider: kind.name().to_string(),
                ok: false,
                error: Some(e.to_string()),
            }),
        }
    }

    let notification = test_notification(&host::hostname(), SystemTime::now());
    report.results.extend(deliver(&notifiers, &notification).await.results);

    print_output(&report, OutputFormat::Table)?;

    let failed = report.failed();
    if failed > 0 {
        return Err(AppError::TestAlertFailed {
            failed,
            total: report.results.len(),
        });
    }
    Ok(())
}

/// Resolve which providers to test
///
/// Accepts `googlechat` and `email` as aliases.
pub fn select_providers(config: &AlertsConfig, filter: Option<&str>) -> Result<Vec<ProviderKind>> {
    let enabled = ProviderKind::ALL
        .into_iter()
        .filter(|kind| kind.is_enabled(config));

    match filter {
        None => {
            let kinds: Vec<ProviderKind> = enabled.collect();
            if kinds.is_empty() {
                return Err(AppError::NoProviders);
            }
            Ok(kinds)
        }
        Some(name) => {
            let normalized = match name.to_lowercase().as_str() {
                "googlechat" => "google_chat".to_string(),
                "email" => "smtp".to_string(),
                other => other.to_string(),
            };
            let wanted = ProviderKind::from_name(&normalized)
                .filter(|kind| kind.is_enabled(config))
                .ok_or_else(|| AppError::ProviderNotFound(name.to_string()))?;
            Ok(vec![wanted])
        }
    }
}

/// The synthetic alert sent by `test-alert`
pub fn test_notification(hostname: &str, at: SystemTime) -> Notification {
    let mut notification =
        Notification::alert("TEST", Severity::Warning, "This is a test alert", at);
    notification.title = format!("Test Alert from {}", hostname);
    notification.message = format!(
        "This is a test alert from TinyMonitor on {}. If you receive this, your alert configuration is working correctly.",
        hostname
    );
    notification
}

/// Send the notification through every notifier concurrently
pub async fn deliver(notifiers: &[Arc<dyn Notifier>], notification: &Notification) -> TestAlertReport {
    let sends = notifiers.iter().map(|notifier| async move {
        let outcome = notifier.send(notification).await;
        ProviderResult {
            provider: notifier.name().to_string(),
            ok: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()),
        }
    });

    TestAlertReport {
        results: join_all(sends).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockNotifier;

    fn alerts(enabled: &[ProviderKind]) -> AlertsConfig {
        let mut config = AlertsConfig::default();
        for kind in enabled {
            match kind {
                ProviderKind::GoogleChat => config.google_chat.routing.enabled = true,
                ProviderKind::Ntfy => config.ntfy.routing.enabled = true,
                ProviderKind::Smtp => config.smtp.routing.enabled = true,
                ProviderKind::Webhook => config.webhook.routing.enabled = true,
                ProviderKind::Gotify => config.gotify.routing.enabled = true,
            }
        }
        config
    }

    #[test]
    fn test_no_enabled_providers() {
        let result = select_providers(&AlertsConfig::default(), None);
        assert!(matches!(result, Err(AppError::NoProviders)));
    }

    #[test]
    fn test_all_enabled_in_registry_order() {
        let config = alerts(&[ProviderKind::Gotify, ProviderKind::Ntfy]);
        let kinds = select_providers(&config, None).unwrap();
        assert_eq!(kinds, vec![ProviderKind::Ntfy, ProviderKind::Gotify]);
    }

    #[test]
    fn test_filter_by_name_and_alias() {
        let config = alerts(&[ProviderKind::GoogleChat, ProviderKind::Smtp]);
        assert_eq!(
            select_providers(&config, Some("email")).unwrap(),
            vec![ProviderKind::Smtp]
        );
        assert_eq!(
            select_providers(&config, Some("GoogleChat")).unwrap(),
            vec![ProviderKind::GoogleChat]
        );
    }

    #[test]
    fn test_filter_disabled_or_unknown() {
        let config = alerts(&[ProviderKind::Smtp]);
        assert!(matches!(
            select_providers(&config, Some("ntfy")),
            Err(AppError::ProviderNotFound(name)) if name == "ntfy"
        ));
        assert!(matches!(
            select_providers(&config, Some("pager")),
            Err(AppError::ProviderNotFound(_))
        ));
    }

    #[test]
    fn test_notification_content() {
        let n = test_notification("web-01", SystemTime::now());
        assert_eq!(n.component, "TEST");
        assert_eq!(n.severity, Severity::Warning);
        assert_eq!(n.title, "Test Alert from web-01");
        assert!(n.message.contains("on web-01"));
    }

    #[tokio::test]
    async fn test_deliver_reports_each_provider() {
        let ok = MockNotifier::new("ntfy");
        let broken = MockNotifier::failing("smtp");
        let notifiers: Vec<Arc<dyn Notifier>> =
            vec![Arc::new(ok.clone()), Arc::new(broken.clone())];

        let report = deliver(&notifiers, &test_notification("host", SystemTime::now())).await;

        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].ok);
        assert!(!report.results[1].ok);
        assert_eq!(report.failed(), 1);
        assert_eq!(ok.sent().len(), 1);
        assert_eq!(broken.attempts(), 1);
    }
}
