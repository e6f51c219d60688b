//! Alert system domain types
//!
//! Defines severities, per-tick readings, and the immutable notification
//! snapshot handed to providers.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Alert severity levels
///
/// OK has no variant: a healthy reading carries `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Attention recommended
    Warning,
    /// Action required
    Critical,
}

impl Severity {
    /// Wire representation (`"WARNING"` / `"CRITICAL"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }

    /// Classify a value against warning/critical thresholds
    ///
    /// `>= critical` wins over `>= warning`; below both is OK.
    pub fn classify(value: f64, warning: f64, critical: f64) -> Option<Self> {
        if value >= critical {
            Some(Self::Critical)
        } else if value >= warning {
            Some(Self::Warning)
        } else {
            None
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reading produced by a metric source during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    /// Component identifier, e.g. `CPU` or `DISK:/data`
    pub component: String,
    /// `None` means OK
    pub severity: Option<Severity>,
    /// Human-formatted value, e.g. `91.5%`
    pub value: String,
}

impl Reading {
    pub fn new(component: impl Into<String>, severity: Option<Severity>, value: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            severity,
            value: value.into(),
        }
    }

    pub fn ok(component: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(component, None, value)
    }
}

/// What a notification announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A confirmed, non-suppressed condition
    Alert,
    /// A confirmed condition returned to normal
    Recovery,
}

/// Immutable snapshot sent to a notification provider
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub component: String,
    /// Active severity for alerts; the severity before recovery otherwise
    pub severity: Severity,
    pub value: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub timestamp: DateTime<Local>,
}

impl Notification {
    /// Build an alert notification with the generated title and summary
    pub fn alert(component: &str, severity: Severity, value: &str, at: SystemTime) -> Self {
        Self {
            component: component.to_string(),
            severity,
            value: value.to_string(),
            title: format!("ALERT {} : {}", severity, component),
            message: format!(
                "Component {} is in state {}. Value: {}",
                component, severity, value
            ),
            kind: NotificationKind::Alert,
            timestamp: DateTime::<Local>::from(at),
        }
    }

    /// Build a recovery notification
    pub fn recovery(component: &str, previous: Severity, value: &str, at: SystemTime) -> Self {
        Self {
            component: component.to_string(),
            severity: previous,
            value: value.to_string(),
            title: format!("RECOVERED : {}", component),
            message: format!(
                "Component {} is back to normal. Previous state: {}. Current value: {}",
                component, previous, value
            ),
            kind: NotificationKind::Recovery,
            timestamp: DateTime::<Local>::from(at),
        }
    }

    pub fn is_recovery(&self) -> bool {
        self.kind == NotificationKind::Recovery
    }

    /// Level label shown by providers (`RECOVERED` for recoveries)
    pub fn level_label(&self) -> &'static str {
        match self.kind {
            NotificationKind::Alert => self.severity.as_str(),
            NotificationKind::Recovery => "RECOVERED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Severity::classify(95.0, 70.0, 90.0), Some(Severity::Critical));
        assert_eq!(Severity::classify(90.0, 70.0, 90.0), Some(Severity::Critical));
        assert_eq!(Severity::classify(70.0, 70.0, 90.0), Some(Severity::Warning));
        assert_eq!(Severity::classify(69.9, 70.0, 90.0), None);
    }

    #[test]
    fn test_severity_wire_format() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");

        let parsed: Severity = serde_json::from_str("\"WARNING\"").unwrap();
        assert_eq!(parsed, Severity::Warning);
        assert!(serde_json::from_str::<Severity>("\"INFO\"").is_err());
    }

    #[test]
    fn test_alert_text() {
        let n = Notification::alert("CPU", Severity::Critical, "97.0%", SystemTime::now());
        assert_eq!(n.title, "ALERT CRITICAL : CPU");
        assert_eq!(n.message, "Component CPU is in state CRITICAL. Value: 97.0%");
        assert_eq!(n.level_label(), "CRITICAL");
        assert!(!n.is_recovery());
    }

    #[test]
    fn test_recovery_text() {
        let n = Notification::recovery("MEMORY", Severity::Warning, "40.0%", SystemTime::now());
        assert_eq!(n.title, "RECOVERED : MEMORY");
        assert!(n.message.contains("Previous state: WARNING"));
        assert_eq!(n.level_label(), "RECOVERED");
        assert!(n.is_recovery());
    }
}
