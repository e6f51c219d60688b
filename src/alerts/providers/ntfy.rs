//! ntfy push provider

use super::{check_status, http_client, markdown_body, DEFAULT_HTTP_TIMEOUT};
use crate::alerts::notifier::Notifier;
use crate::alerts::routing::RoutingFilter;
use crate::alerts::types::{Notification, NotificationKind, Severity};
use crate::config::NtfyConfig;
use crate::error::NotifyError;
use crate::host::HostContext;
use crate::logging::LogHandle;
use async_trait::async_trait;

pub struct NtfyProvider {
    filter: RoutingFilter,
    topic_url: String,
    token: String,
    client: reqwest::Client,
    log: LogHandle,
}

impl NtfyProvider {
    pub fn new(config: &NtfyConfig, log: LogHandle) -> Result<Self, NotifyError> {
        Ok(Self {
            filter: RoutingFilter::new(&config.routing),
            topic_url: config.topic_url.clone(),
            token: config.token.clone(),
            client: http_client(DEFAULT_HTTP_TIMEOUT)?,
            log,
        })
    }
}

/// (priority, tags) header values
fn priority_and_tags(notification: &Notification) -> (&'static str, &'static str) {
    match (notification.kind, notification.severity) {
        (NotificationKind::Recovery, _) => ("2", "white_check_mark,recovered"),
        (NotificationKind::Alert, Severity::Critical) => ("5", "rotating_light,critical"),
        (NotificationKind::Alert, Severity::Warning) => ("3", "warning"),
    }
}

#[async_trait]
impl Notifier for NtfyProvider {
    fn name(&self) -> &str {
        "ntfy"
    }

    fn should_send(&self, component: &str, severity: Severity) -> bool {
        self.filter.should_send(component, severity)
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.topic_url.is_empty() {
            return Err(NotifyError::MissingField("topic_url"));
        }

        let host = HostContext::collect().await;
        let (priority, tags) = priority_and_tags(notification);

        let mut request = self
            .client
            .post(&self.topic_url)
            .header("Title", notification.title.as_str())
            .header("Priority", priority)
            .header("Tags", tags)
            .header("Markdown", "yes")
            .body(markdown_body(notification, &host));

        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request.send().await?;
        check_status(&response, false)?;

        log::info!(target: self.log.target(), "Alert sent successfully");
        Ok(())
    }
}
