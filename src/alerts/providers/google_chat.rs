//! Google Chat webhook provider (cardsV2 messages)

use super::{alert_time, check_status, http_client, DEFAULT_HTTP_TIMEOUT};
use crate::alerts::notifier::Notifier;
use crate::alerts::routing::RoutingFilter;
use crate::alerts::types::{Notification, NotificationKind, Severity};
use crate::config::GoogleChatConfig;
use crate::error::NotifyError;
use crate::host::HostContext;
use crate::logging::LogHandle;
use async_trait::async_trait;
use serde_json::{json, Value};

const HEADER_IMAGE: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/3/35/Tux.svg/1200px-Tux.svg.png";

pub struct GoogleChatProvider {
    filter: RoutingFilter,
    webhook_url: String,
    client: reqwest::Client,
    log: LogHandle,
}

impl GoogleChatProvider {
    pub fn new(config: &GoogleChatConfig, log: LogHandle) -> Result<Self, NotifyError> {
        Ok(Self {
            filter: RoutingFilter::new(&config.routing),
            webhook_url: config.webhook_url.clone(),
            client: http_client(DEFAULT_HTTP_TIMEOUT)?,
            log,
        })
    }
}

/// Keep only characters accepted in a card id
fn card_id_part(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn decoration(notification: &Notification) -> (&'static str, &'static str, String) {
    let component = &notification.component;
    match (notification.kind, notification.severity) {
        (NotificationKind::Recovery, _) => ("✅", "#00AA00", format!("RECOVERED : {}", component)),
        (NotificationKind::Alert, Severity::Critical) => {
            ("🚨", "#FF0000", format!("CRITICAL ALERT : {}", component))
        }
        (NotificationKind::Alert, Severity::Warning) => {
            ("⚠️", "#FFA500", format!("WARNING : {}", component))
        }
    }
}

pub(crate) fn build_payload(notification: &Notification, host: &HostContext) -> Value {
    let (icon, color, title) = decoration(notification);

    json!({
        "cardsV2": [{
            "cardId": format!(
                "tinymonitor-{}-{}",
                card_id_part(&host.hostname),
                card_id_part(&notification.component)
            ),
            "card": {
                "header": {
                    "title": format!("{} {}", icon, title),
                    "subtitle": format!("Server : {}", host.hostname),
                    "imageUrl": HEADER_IMAGE,
                    "imageType": "CIRCLE",
                },
                "sections": [
                    {
                        "header": "Incident Details",
                        "widgets": [
                            {
                                "decoratedText": {
                                    "topLabel": "Monitored Component",
                                    "text": format!("<b>{}</b>", notification.component),
                                    "startIcon": { "knownIcon": "MEMBERSHIP" },
                                }
                            },
                            {
                                "decoratedText": {
                                    "topLabel": "Current Value",
                                    "text": format!(
                                        "<font color=\"{}\"><b>{}</b></font>",
                                        color, notification.value
                                    ),
                                    "startIcon": { "knownIcon": "DESCRIPTION" },
                                }
                            },
                            {
                                "decoratedText": {
                                    "topLabel": "Alert Level",
                                    "text": format!("<b>{}</b>", notification.level_label()),
                                    "startIcon": { "knownIcon": "STAR" },
                                }
                            },
                        ],
                    },
                    {
                        "header": "Machine Context",
                        "collapsible": true,
                        "uncollapsibleWidgetsCount": 2,
                        "widgets": [
                            {
                                "textParagraph": {
                                    "text": format!(
                                        "<b>Private IP:</b> {}<br><b>Public IP:</b> {}",
                                        host.ip_private, host.ip_public
                                    ),
                                }
                            },
                            {
                                "textParagraph": {
                                    "text": format!(
                                        "<b>Load:</b> {}<br><b>Uptime:</b> {}",
                                        host.load_average, host.uptime
                                    ),
                                }
                            },
                            {
                                "textParagraph": {
                                    "text": format!(
                                        "<font color=\"#808080\">Alert Time: {}</font>",
                                        alert_time(notification)
                                    ),
                                }
                            },
                        ],
                    },
                ],
            },
        }]
    })
}

#[async_trait]
impl Notifier for GoogleChatProvider {
    fn name(&self) -> &str {
        "google_chat"
    }

    fn should_send(&self, component: &str, severity: Severity) -> bool {
        self.filter.should_send(component, severity)
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.webhook_url.is_empty() {
            return Err(NotifyError::MissingField("webhook_url"));
        }

        let host = HostContext::collect().await;
        let payload = build_payload(notification, &host);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;
        check_status(&response, false)?;

        log::info!(target: self.log.target(), "Alert sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_card_id_is_sanitized() {
        assert_eq!(card_id_part("DISK:/data"), "DISK__data");
        assert_eq!(card_id_part("web-1.example"), "web-1_example");

        let payload = build_payload(&critical(), &host());
        assert_eq!(
            payload["cardsV2"][0]["cardId"],
            "tinymonitor-web-1-DISK__data"
        );
    }

    #[test]
    fn test_header_reflects_level() {
        let payload = build_payload(&critical(), &host());
        let header = &payload["cardsV2"][0]["card"]["header"];
        assert_eq!(header["title"], "🚨 CRITICAL ALERT : DISK:/data");
        assert_eq!(header["subtitle"], "Server : web-1");

        let payload = build_payload(&recovery(), &host());
        let header = &payload["cardsV2"][0]["card"]["header"];
        assert_eq!(header["title"], "✅ RECOVERED : CPU");
    }

    #[test]
    fn test_value_widget_is_colored() {
        let payload = build_payload(&critical(), &host());
        let value = &payload["cardsV2"][0]["card"]["sections"][0]["widgets"][1]["decoratedText"]["text"];
        assert_eq!(value, "<font color=\"#FF0000\"><b>95.0%</b></font>");
    }

    #[tokio::test]
    async fn test_missing_url_is_a_config_fault() {
        let mut config = GoogleChatConfig::default();
        config.routing.enabled = true;
        let provider = GoogleChatProvider::new(&config, LogHandle::root()).unwrap();

        let err = provider.send(&critical()).await.unwrap_err();
        assert!(matches!(err, NotifyError::MissingField("webhook_url")));
    }
}
