//! Generic JSON webhook provider

use super::{check_status, http_client};
use crate::alerts::notifier::Notifier;
use crate::alerts::routing::RoutingFilter;
use crate::alerts::types::{Notification, Severity};
use crate::config::{seconds, WebhookConfig};
use crate::error::NotifyError;
use crate::host::HostContext;
use crate::logging::LogHandle;
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use std::time::Duration;

pub struct WebhookProvider {
    filter: RoutingFilter,
    url: String,
    headers: HeaderMap,
    client: reqwest::Client,
    log: LogHandle,
}

impl WebhookProvider {
    pub fn new(config: &WebhookConfig, log: LogHandle) -> Result<Self, NotifyError> {
        let timeout = if config.timeout > 0 {
            seconds(config.timeout)
        } else {
            Duration::from_secs(10)
        };

        Ok(Self {
            filter: RoutingFilter::new(&config.routing),
            url: config.url.clone(),
            headers: build_headers(config)?,
            client: http_client(timeout)?,
            log,
        })
    }
}

/// Configured headers, with a JSON content type unless one is given
fn build_headers(config: &WebhookConfig) -> Result<HeaderMap, NotifyError> {
    let mut headers = HeaderMap::new();

    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| NotifyError::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| NotifyError::InvalidHeader(name.as_str().to_string()))?;
        headers.insert(name, value);
    }

    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    Ok(headers)
}

#[derive(Debug, Serialize)]
pub(crate) struct WebhookPayload<'a> {
    timestamp: String,
    alert: AlertBody<'a>,
    host: &'a HostContext,
}

#[derive(Debug, Serialize)]
struct AlertBody<'a> {
    level: &'static str,
    component: &'a str,
    value: &'a str,
    title: &'a str,
    message: &'a str,
}

impl<'a> WebhookPayload<'a> {
    pub(crate) fn new(notification: &'a Notification, host: &'a HostContext) -> Self {
        Self {
            timestamp: notification
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            alert: AlertBody {
                level: notification.level_label(),
                component: &notification.component,
                value: &notification.value,
                title: &notification.title,
                message: &notification.message,
            },
            host,
        }
    }
}

#[async_trait]
impl Notifier for WebhookProvider {
    fn name(&self) -> &str {
        "webhook"
    }

    fn should_send(&self, component: &str, severity: Severity) -> bool {
        self.filter.should_send(component, severity)
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.url.is_empty() {
            return Err(NotifyError::MissingField("url"));
        }

        let host = HostContext::collect().await;
        let body = serde_json::to_vec(&WebhookPayload::new(notification, &host))?;

        let response = self
            .client
            .post(&self.url)
            .headers(self.headers.clone())
            .body(body)
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
    fn test_default_content_type() {
        let headers = build_headers(&WebhookConfig::default()).unwrap();
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_custom_headers_kept() {
        let mut config = WebhookConfig::default();
        config
            .headers
            .insert("Authorization".into(), "Bearer abc".into());
        config
            .headers
            .insert("Content-Type".into(), "application/vnd.alert+json".into());

        let headers = build_headers(&config).unwrap();
        assert_eq!(headers["authorization"], "Bearer abc");
        assert_eq!(headers[CONTENT_TYPE], "application/vnd.alert+json");
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut config = WebhookConfig::default();
        config.headers.insert("Bad Header".into(), "x".into());
        assert!(matches!(
            build_headers(&config),
            Err(NotifyError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_payload_shape() {
        let notification = critical();
        let host = host();
        let json = serde_json::to_value(WebhookPayload::new(&notification, &host)).unwrap();

        assert_eq!(json["alert"]["level"], "CRITICAL");
        assert_eq!(json["alert"]["component"], "DISK:/data");
        assert_eq!(json["alert"]["value"], "95.0%");
        assert_eq!(json["alert"]["title"], "ALERT CRITICAL : DISK:/data");
        assert_eq!(json["host"]["hostname"], "web-1");
        assert_eq!(json["host"]["uptime"], "12h 3m");
        assert!(json["timestamp"].as_str().unwrap().starts_with("2023-11-1"));
    }

    #[tokio::test]
    async fn test_missing_url_is_a_config_fault() {
        let provider = WebhookProvider::new(&WebhookConfig::default(), LogHandle::root()).unwrap();
        let err = provider.send(&critical()).await.unwrap_err();
        assert!(matches!(err, NotifyError::MissingField("url")));
    }
}
