//! Gotify push provider

use super::{check_status, http_client, markdown_body, DEFAULT_HTTP_TIMEOUT};
use crate::alerts::notifier::Notifier;
use crate::alerts::routing::RoutingFilter;
use crate::alerts::types::{Notification, NotificationKind, Severity};
use crate::config::GotifyConfig;
use crate::error::NotifyError;
use crate::host::HostContext;
use crate::logging::LogHandle;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct GotifyProvider {
    filter: RoutingFilter,
    url: String,
    token: String,
    client: reqwest::Client,
    log: LogHandle,
}

impl GotifyProvider {
    pub fn new(config: &GotifyConfig, log: LogHandle) -> Result<Self, NotifyError> {
        Ok(Self {
            filter: RoutingFilter::new(&config.routing),
            url: config.url.clone(),
            token: config.token.clone(),
            client: http_client(DEFAULT_HTTP_TIMEOUT)?,
            log,
        })
    }
}

/// Append `/message` unless the URL already ends with it
pub(crate) fn message_url(base: &str) -> String {
    if base.ends_with("/message") {
        base.to_string()
    } else if base.ends_with('/') {
        format!("{}message", base)
    } else {
        format!("{}/message", base)
    }
}

fn priority(notification: &Notification) -> u8 {
    match (notification.kind, notification.severity) {
        (NotificationKind::Recovery, _) => 3,
        (NotificationKind::Alert, Severity::Critical) => 8,
        (NotificationKind::Alert, Severity::Warning) => 5,
    }
}

pub(crate) fn build_payload(notification: &Notification, host: &HostContext) -> Value {
    json!({
        "title": notification.title,
        "message": markdown_body(notification, host),
        "priority": priority(notification),
        "extras": {
            "client::display": { "contentType": "text/markdown" }
        }
    })
}

#[async_trait]
impl Notifier for GotifyProvider {
    fn name(&self) -> &str {
        "gotify"
    }

    fn should_send(&self, component: &str, severity: Severity) -> bool {
        self.filter.should_send(component, severity)
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.url.is_empty() {
            return Err(NotifyError::MissingField("url"));
        }
        if self.token.is_empty() {
            return Err(NotifyError::MissingField("token"));
        }

        let host = HostContext::collect().await;
        let response = self
            .client
            .post(message_url(&self.url))
            .header("X-Gotify-Key", self.token.as_str())
            .json(&build_payload(notification, &host))
            .send()
            .await?;
        check_status(&response, true)?;

        log::info!(target: self.log.target(), "Alert sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_message_url() {
        assert_eq!(message_url("https://push.example.com"), "https://push.example.com/message");
        assert_eq!(message_url("https://push.example.com/"), "https://push.example.com/message");
        assert_eq!(
            message_url("https://push.example.com/message"),
            "https://push.example.com/message"
        );
    }

    #[test]
    fn test_payload() {
        let payload = build_payload(&critical(), &host());
        assert_eq!(payload["title"], "ALERT CRITICAL : DISK:/data");
        assert_eq!(payload["priority"], 8);
        assert_eq!(
            payload["extras"]["client::display"]["contentType"],
            "text/markdown"
        );

        let payload = build_payload(&recovery(), &host());
        assert_eq!(payload["priority"], 3);
    }

    #[tokio::test]
    async fn test_missing_token_is_a_config_fault() {
        let config = GotifyConfig {
            url: "https://push.example.com".into(),
            ..GotifyConfig::default()
        };
        let provider = GotifyProvider::new(&config, LogHandle::root()).unwrap();
        let err = provider.send(&critical()).await.unwrap_err();
        assert!(matches!(err, NotifyError::MissingField("token")));
    }
}
