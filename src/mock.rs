//! Mock implementations for testing
//!
//! Provides a scripted metric source and a recording notifier so the
//! evaluation loop can be tested without touching the OS or the network.

use crate::alerts::notifier::Notifier;
use crate::alerts::routing::RoutingFilter;
use crate::alerts::types::{Notification, Reading, Severity};
use crate::config::RoutingConfig;
use crate::error::{CollectError, NotifyError};
use crate::metrics::MetricSource;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted tick of a [`MockSource`]
pub enum Step {
    Readings(Vec<Reading>),
    Fail,
    Panic,
}

/// Metric source replaying a script, one step per check
///
/// Once the script is exhausted every check returns no readings.
pub struct MockSource {
    name: String,
    debounce: Duration,
    script: VecDeque<Step>,
    checks: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn new(name: &str, debounce: Duration) -> Self {
        Self {
            name: name.to_string(),
            debounce,
            script: VecDeque::new(),
            checks: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue one tick of readings
    pub fn then(mut self, readings: Vec<Reading>) -> Self {
        self.script.push_back(Step::Readings(readings));
        self
    }

    /// Queue a single reading for one tick
    pub fn then_one(self, component: &str, severity: Option<Severity>, value: &str) -> Self {
        self.then(vec![Reading::new(component, severity, value)])
    }

    /// Queue a collection fault
    pub fn then_fail(mut self) -> Self {
        self.script.push_back(Step::Fail);
        self
    }

    /// Queue a panic inside `check`
    pub fn then_panic(mut self) -> Self {
        self.script.push_back(Step::Panic);
        self
    }

    /// Shared counter of `check` calls
    pub fn checks(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.checks)
    }
}

impl MetricSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn debounce(&self) -> Duration {
        self.debounce
    }

    fn check(&mut self) -> Result<Vec<Reading>, CollectError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(Step::Readings(readings)) => Ok(readings),
            Some(Step::Fail) => Err(CollectError::Unsupported("mock failure")),
            Some(Step::Panic) => panic!("mock source panicked"),
            None => Ok(Vec::new()),
        }
    }
}

/// Notifier that records every notification it is asked to send
#[derive(Clone)]
pub struct MockNotifier {
    name: String,
    filter: RoutingFilter,
    fail: bool,
    sent: Arc<Mutex<Vec<Notification>>>,
    attempts: Arc<AtomicUsize>,
}

impl MockNotifier {
    /// Enabled, accepting WARNING and CRITICAL for every component
    pub fn new(name: &str) -> Self {
        Self::with_routing(
            name,
            RoutingConfig {
                enabled: true,
                ..RoutingConfig::default()
            },
        )
    }

    pub fn with_levels(name: &str, levels: Vec<Severity>) -> Self {
        Self::with_routing(
            name,
            RoutingConfig {
                enabled: true,
                levels,
                ..RoutingConfig::default()
            },
        )
    }

    pub fn with_routing(name: &str, routing: RoutingConfig) -> Self {
        Self {
            name: name.to_string(),
            filter: RoutingFilter::new(&routing),
            fail: false,
            sent: Arc::new(Mutex::new(Vec::new())),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A notifier whose every send fails with a transport fault
    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    /// Notifications delivered successfully
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of send calls, successful or not
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_send(&self, component: &str, severity: Severity) -> bool {
        self.filter.should_send(component, severity)
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(NotifyError::Status(503));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_replays_script() {
        let mut source = MockSource::new("cpu", Duration::ZERO)
            .then_one("CPU", Some(Severity::Warning), "75.0%")
            .then_fail();
        let checks = source.checks();

        assert_eq!(source.check().unwrap().len(), 1);
        assert!(source.check().is_err());
        assert!(source.check().unwrap().is_empty());
        assert_eq!(checks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_mock_notifier_records() {
        let notifier = MockNotifier::new("chat");
        let n = Notification::alert("CPU", Severity::Critical, "99.0%", std::time::SystemTime::now());

        notifier.send(&n).await.unwrap();
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(notifier.attempts(), 1);

        let failing = MockNotifier::failing("broken");
        assert!(failing.send(&n).await.is_err());
        assert!(failing.sent().is_empty());
        assert_eq!(failing.attempts(), 1);
    }
}
