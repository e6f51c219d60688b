//! Notification providers
//!
//! One module per transport. Shared here: the HTTP client setup, the status
//! check and the markdown body used by the push services.

mod google_chat;
mod gotify;
mod ntfy;
mod smtp;
mod webhook;

pub use google_chat::GoogleChatProvider;
pub use gotify::GotifyProvider;
pub use ntfy::NtfyProvider;
pub use smtp::SmtpProvider;
pub use webhook::WebhookProvider;

use crate::alerts::types::Notification;
use crate::error::NotifyError;
use crate::host::HostContext;
use std::time::Duration;

/// Timeout for provider HTTP calls unless configured otherwise
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, NotifyError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Map a response status to a transport fault
pub(crate) fn check_status(
    response: &reqwest::Response,
    accept_any_2xx: bool,
) -> Result<(), NotifyError> {
    let status = response.status();
    let ok = if accept_any_2xx {
        status.is_success()
    } else {
        status == reqwest::StatusCode::OK
    };

    if ok {
        Ok(())
    } else {
        Err(NotifyError::Status(status.as_u16()))
    }
}

pub(crate) fn alert_time(notification: &Notification) -> String {
    notification.timestamp.format(TIME_FORMAT).to_string()
}

/// Markdown body shared by ntfy and Gotify
pub(crate) fn markdown_body(notification: &Notification, host: &HostContext) -> String {
    format!(
        "**Component** : {}\n\
         **Value**     : {}\n\
         **Level**     : {}\n\
         \n\
         __Machine Context__\n\
         🖥️ **Server**    : `{}`\n\
         🏠 **Private IP**: `{}`\n\
         🌍 **Public IP** : `{}`\n\
         ⚙️ **Load Avg**  : `{}`\n\
         ⏱️ **Uptime**    : `{}`\n\
         🕒 **Time**      : {}",
        notification.component,
        notification.value,
        notification.level_label(),
        host.hostname,
        host.ip_private,
        host.ip_public,
        host.load_average,
        host.uptime,
        alert_time(notification),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::alerts::types::Severity;
    use std::time::{SystemTime, UNIX_EPOCH};

    pub fn host() -> HostContext {
        HostContext {
            hostname: "web-1".into(),
            ip_private: "10.0.0.5".into(),
            ip_public: "203.0.113.7".into(),
            uptime: "12h 3m".into(),
            load_average: "0.50, 0.40, 0.30".into(),
        }
    }

    pub fn at() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    pub fn critical() -> Notification {
        Notification::alert("DISK:/data", Severity::Critical, "95.0%", at())
    }

    pub fn recovery() -> Notification {
        Notification::recovery("CPU", Severity::Warning, "12.0%", at())
    }
}
