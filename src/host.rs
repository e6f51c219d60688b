//! Machine context attached to notifications
//!
//! Every lookup degrades to a placeholder instead of failing.

use serde::Serialize;
use std::net::UdpSocket;
use std::time::Duration;
use sysinfo::System;

const PUBLIC_IP_URL: &str = "https://api.ipify.org";
const PUBLIC_IP_TIMEOUT: Duration = Duration::from_secs(3);

/// Snapshot of the host a notification is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostContext {
    pub hostname: String,
    pub ip_private: String,
    pub ip_public: String,
    pub uptime: String,
    pub load_average: String,
}

impl HostContext {
    /// Gather everything, including the public IP lookup
    pub async fn collect() -> Self {
        let mut context = Self::local();
        context.ip_public = public_ip().await;
        context
    }

    /// Gather what can be read without leaving the machine
    pub fn local() -> Self {
        Self {
            hostname: hostname(),
            ip_private: private_ip(),
            ip_public: "N/A".to_string(),
            uptime: format_uptime(System::uptime()),
            load_average: load_average(),
        }
    }
}

pub fn hostname() -> String {
    System::host_name().unwrap_or_else(|| "unknown".to_string())
}

/// Address of the interface used for outbound traffic
///
/// Connecting a UDP socket sends nothing; it only selects a route.
pub fn private_ip() -> String {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "127.0.0.1".to_string())
}

pub async fn public_ip() -> String {
    let lookup = async {
        let client = reqwest::Client::builder()
            .timeout(PUBLIC_IP_TIMEOUT)
            .build()?;
        client.get(PUBLIC_IP_URL).send().await?.text().await
    };

    match lookup.await {
        Ok(ip) if !ip.trim().is_empty() => ip.trim().to_string(),
        _ => "N/A".to_string(),
    }
}

/// 1, 5 and 15 minute load averages
pub fn load_average() -> String {
    let load = System::load_average();
    format!("{:.2}, {:.2}, {:.2}", load.one, load.five, load.fifteen)
}

/// Format seconds of uptime as `"<h>h <m>m"`
pub fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    format!("{}h {}m", hours, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0h 0m");
        assert_eq!(format_uptime(59), "0h 0m");
        assert_eq!(format_uptime(3 * 3600 + 25 * 60 + 10), "3h 25m");
        assert_eq!(format_uptime(50 * 3600), "50h 0m");
    }

    #[test]
    fn test_local_context_is_populated() {
        let context = HostContext::local();
        assert!(!context.hostname.is_empty());
        assert!(!context.ip_private.is_empty());
        assert_eq!(context.ip_public, "N/A");
        assert!(context.uptime.ends_with('m'));
        assert_eq!(context.load_average.split(", ").count(), 3);
    }

    #[test]
    fn test_context_serializes_with_payload_keys() {
        let context = HostContext {
            hostname: "web-1".into(),
            ip_private: "10.0.0.5".into(),
            ip_public: "N/A".into(),
            uptime: "1h 2m".into(),
            load_average: "0.10, 0.20, 0.30".into(),
        };
        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["hostname"], "web-1");
        assert_eq!(json["ip_private"], "10.0.0.5");
        assert_eq!(json["load_average"], "0.10, 0.20, 0.30");
    }
}
