//! SMTP email provider

use super::alert_time;
use crate::alerts::notifier::Notifier;
use crate::alerts::routing::RoutingFilter;
use crate::alerts::types::{Notification, Severity};
use crate::config::SmtpConfig;
use crate::error::NotifyError;
use crate::host::HostContext;
use crate::logging::LogHandle;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

type Transport = AsyncSmtpTransport<Tokio1Executor>;

pub struct SmtpProvider {
    filter: RoutingFilter,
    config: SmtpConfig,
    log: LogHandle,
}

impl SmtpProvider {
    pub fn new(config: &SmtpConfig, log: LogHandle) -> Result<Self, NotifyError> {
        Ok(Self {
            filter: RoutingFilter::new(&config.routing),
            config: config.clone(),
            log,
        })
    }

    fn check_required(&self) -> Result<(), NotifyError> {
        let c = &self.config;
        if c.host.is_empty() {
            return Err(NotifyError::MissingField("host"));
        }
        if c.user.is_empty() {
            return Err(NotifyError::MissingField("user"));
        }
        if c.password.is_empty() {
            return Err(NotifyError::MissingField("password"));
        }
        if c.from_addr.is_empty() {
            return Err(NotifyError::MissingField("from_addr"));
        }
        if c.to_addrs.is_empty() {
            return Err(NotifyError::MissingField("to_addrs"));
        }
        Ok(())
    }

    fn port(&self) -> Result<u16, NotifyError> {
        u16::try_from(self.config.port)
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| NotifyError::Email(format!("invalid port {}", self.config.port)))
    }

    fn credentials(&self) -> Credentials {
        Credentials::new(self.config.user.clone(), self.config.password.clone())
    }

    /// Transport without mandatory encryption; upgrades when offered
    fn plain_transport(&self, port: u16) -> Result<Transport, NotifyError> {
        let tls = TlsParameters::new(self.config.host.clone()).map_err(email_error)?;
        Ok(Transport::builder_dangerous(&self.config.host)
            .port(port)
            .tls(Tls::Opportunistic(tls))
            .credentials(self.credentials())
            .build())
    }

    async fn deliver(&self, message: Message) -> Result<(), NotifyError> {
        let port = self.port()?;

        if !self.config.use_tls {
            let transport = self.plain_transport(port)?;
            transport.send(message).await.map_err(email_error)?;
            return Ok(());
        }

        // Implicit TLS first, STARTTLS on the same port if that fails
        let implicit = Transport::relay(&self.config.host)
            .map_err(email_error)?
            .port(port)
            .credentials(self.credentials())
            .build();

        match implicit.send(message.clone()).await {
            Ok(_) => Ok(()),
            Err(e) => {
                log::debug!(
                    target: self.log.target(),
                    "Implicit TLS failed ({}), trying STARTTLS",
                    e
                );
                let starttls = Transport::starttls_relay(&self.config.host)
                    .map_err(email_error)?
                    .port(port)
                    .credentials(self.credentials())
                    .build();
                starttls.send(message).await.map_err(email_error)?;
                Ok(())
            }
        }
    }
}

fn email_error(e: impl std::fmt::Display) -> NotifyError {
    NotifyError::Email(e.to_string())
}

pub(crate) fn subject(notification: &Notification, hostname: &str) -> String {
    format!(
        "[{}] {} on {} - {}",
        notification.level_label(),
        notification.component,
        hostname,
        notification.value
    )
}

pub(crate) fn html_body(notification: &Notification, host: &HostContext) -> String {
    format!(
        r#"<html>
<body>
    <h2>{title}</h2>
    <p><strong>Component:</strong> {component}</p>
    <p><strong>Value:</strong> {value}</p>
    <p><strong>Level:</strong> {level}</p>
    <hr>
    <h3>Machine Context</h3>
    <ul>
        <li><strong>Server:</strong> {hostname}</li>
        <li><strong>Private IP:</strong> {ip_private}</li>
        <li><strong>Public IP:</strong> {ip_public}</li>
        <li><strong>Load Avg:</strong> {load}</li>
        <li><strong>Uptime:</strong> {uptime}</li>
        <li><strong>Time:</strong> {time}</li>
    </ul>
</body>
</html>"#,
        title = notification.title,
        component = notification.component,
        value = notification.value,
        level = notification.level_label(),
        hostname = host.hostname,
        ip_private = host.ip_private,
        ip_public = host.ip_public,
        load = host.load_average,
        uptime = host.uptime,
        time = alert_time(notification),
    )
}

fn build_message(
    config: &SmtpConfig,
    notification: &Notification,
    host: &HostContext,
) -> Result<Message, NotifyError> {
    let from: Mailbox = config.from_addr.parse().map_err(email_error)?;
    let mut builder = Message::builder()
        .from(from)
        .subject(subject(notification, &host.hostname))
        .header(ContentType::TEXT_HTML);

    for to in &config.to_addrs {
        let to: Mailbox = to.parse().map_err(email_error)?;
        builder = builder.to(to);
    }

    builder
        .body(html_body(notification, host))
        .map_err(email_error)
}

#[async_trait]
impl Notifier for SmtpProvider {
    fn name(&self) -> &str {
        "smtp"
    }

    fn should_send(&self, component: &str, severity: Severity) -> bool {
        self.filter.should_send(component, severity)
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.check_required()?;

        let host = HostContext::collect().await;
        let message = build_message(&self.config, notification, &host)?;
        self.deliver(message).await?;

        log::info!(
            target: self.log.target(),
            "Email sent to {}",
            self.config.to_addrs.join(", ")
        );
        Ok(())
    }
}
