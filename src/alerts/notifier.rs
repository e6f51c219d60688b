//! Notification channel abstraction
//!
//! Every provider implements [`Notifier`]. The set of providers is closed and
//! listed in [`ProviderKind::ALL`]; the table is walked once at startup.

use super::providers::{
    GoogleChatProvider, GotifyProvider, NtfyProvider, SmtpProvider, WebhookProvider,
};
use super::types::{Notification, Severity};
use crate::config::AlertsConfig;
use crate::error::NotifyError;
use crate::logging::LogHandle;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Notification channel trait
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for identification
    fn name(&self) -> &str;

    /// Whether this channel accepts the component/severity pair
    fn should_send(&self, component: &str, severity: Severity) -> bool;

    /// Deliver one notification
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Every supported provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    GoogleChat,
    Ntfy,
    Smtp,
    Webhook,
    Gotify,
}

impl ProviderKind {
    /// Registration order used when building providers
    pub const ALL: [ProviderKind; 5] = [
        Self::GoogleChat,
        Self::Ntfy,
        Self::Smtp,
        Self::Webhook,
        Self::Gotify,
    ];

    /// Configuration key / CLI name
    pub fn name(self) -> &'static str {
        match self {
            Self::GoogleChat => "google_chat",
            Self::Ntfy => "ntfy",
            Self::Smtp => "smtp",
            Self::Webhook => "webhook",
            Self::Gotify => "gotify",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::GoogleChat => "Google Chat",
            Self::Ntfy => "Ntfy",
            Self::Smtp => "SMTP",
            Self::Webhook => "Webhook",
            Self::Gotify => "Gotify",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn is_enabled(self, config: &AlertsConfig) -> bool {
        match self {
            Self::GoogleChat => config.google_chat.routing.enabled,
            Self::Ntfy => config.ntfy.routing.enabled,
            Self::Smtp => config.smtp.routing.enabled,
            Self::Webhook => config.webhook.routing.enabled,
            Self::Gotify => config.gotify.routing.enabled,
        }
    }

    /// Construct the provider for this kind
    pub fn build(
        self,
        config: &AlertsConfig,
        log: &LogHandle,
    ) -> Result<Arc<dyn Notifier>, NotifyError> {
        let log = log.child(self.name());
        Ok(match self {
            Self::GoogleChat => Arc::new(GoogleChatProvider::new(&config.google_chat, log)?),
            Self::Ntfy => Arc::new(NtfyProvider::new(&config.ntfy, log)?),
            Self::Smtp => Arc::new(SmtpProvider::new(&config.smtp, log)?),
            Self::Webhook => Arc::new(WebhookProvider::new(&config.webhook, log)?),
            Self::Gotify => Arc::new(GotifyProvider::new(&config.gotify, log)?),
        })
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build every enabled provider
///
/// A provider that cannot be constructed is logged and skipped.
pub fn build_providers(config: &AlertsConfig, log: &LogHandle) -> Vec<Arc<dyn Notifier>> {
    let mut providers = Vec::new();

    for kind in ProviderKind::ALL {
        if !kind.is_enabled(config) {
            continue;
        }
        match kind.build(config, log) {
            Ok(provider) => {
                log::info!(target: log.target(), "Alert provider loaded: {}", kind.label());
                providers.push(provider);
            }
            Err(e) => {
                log::error!(
                    target: log.target(),
                    "Failed to load alert provider {}: {}",
                    kind.label(),
                    e
                );
            }
        }
    }

    providers
}
