//! Alert dispatcher
//!
//! Decides whether a confirmed reading is announced now, records the
//! announcement, and fans the notification out to every eligible provider
//! through the worker pool. The last-alert ledger is only written from the
//! evaluation loop; workers get an owned [`Notification`] and nothing else.

use super::notifier::Notifier;
use super::pool::WorkerPool;
use super::types::{Notification, Reading, Severity};
use crate::logging::LogHandle;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Deduplication policy for repeated alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownPolicy {
    /// Re-announce once strictly more than this much time has passed
    FixedCooldown(Duration),
    /// Announce each incident exactly once
    OncePerIncident,
}

impl CooldownPolicy {
    /// Map the configured `cooldown` seconds; any negative value means
    /// once per incident
    pub fn from_seconds(cooldown: i64) -> Self {
        if cooldown < 0 {
            Self::OncePerIncident
        } else {
            Self::FixedCooldown(Duration::from_secs(cooldown as u64))
        }
    }
}

impl std::fmt::Display for CooldownPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedCooldown(d) => write!(f, "{}s cooldown", d.as_secs()),
            Self::OncePerIncident => f.write_str("once per incident"),
        }
    }
}

/// Last dispatch time per component
#[derive(Debug)]
pub struct AlertLedger {
    policy: CooldownPolicy,
    last_alert: HashMap<String, SystemTime>,
}

impl AlertLedger {
    pub fn new(policy: CooldownPolicy) -> Self {
        Self {
            policy,
            last_alert: HashMap::new(),
        }
    }

    pub fn policy(&self) -> CooldownPolicy {
        self.policy
    }

    /// Decide whether the component may be announced at `now`, recording it
    /// if so
    ///
    /// `incident_start` is only consulted for [`CooldownPolicy::OncePerIncident`];
    /// without it nothing is sent.
    pub fn try_claim(
        &mut self,
        component: &str,
        incident_start: Option<SystemTime>,
        now: SystemTime,
    ) -> bool {
        let last = self.last_alert.get(component).copied();

        let allowed = match self.policy {
            CooldownPolicy::FixedCooldown(cooldown) => match last {
                None => true,
                Some(last) => now.duration_since(last).unwrap_or_default() > cooldown,
            },
            CooldownPolicy::OncePerIncident => match (last, incident_start) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(last), Some(start)) => last < start,
            },
        };

        if allowed {
            self.last_alert.insert(component.to_string(), now);
        }
        allowed
    }

    /// When the component was last announced
    pub fn last_alert(&self, component: &str) -> Option<SystemTime> {
        self.last_alert.get(component).copied()
    }
}

/// Outcome of a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Suppressed by the cooldown policy
    Suppressed,
    /// Dispatched; `queued` providers received a job
    Dispatched { queued: usize },
}

/// Alert dispatcher with cooldown and provider fan-out
pub struct Dispatcher {
    ledger: AlertLedger,
    providers: Vec<Arc<dyn Notifier>>,
    pool: WorkerPool,
    send_recovery: bool,
    log: LogHandle,
}

impl Dispatcher {
    pub fn new(
        policy: CooldownPolicy,
        providers: Vec<Arc<dyn Notifier>>,
        pool: WorkerPool,
        send_recovery: bool,
        log: LogHandle,
    ) -> Self {
        Self {
            ledger: AlertLedger::new(policy),
            providers,
            pool,
            send_recovery,
            log,
        }
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Handle a confirmed reading
    ///
    /// The ledger is updated on dispatch, whatever the transport outcome.
    pub fn trigger_at(
        &mut self,
        reading: &Reading,
        incident_start: Option<SystemTime>,
        now: SystemTime,
    ) -> DispatchOutcome {
        let Some(severity) = reading.severity else {
            return DispatchOutcome::Suppressed;
        };

        if !self
            .ledger
            .try_claim(&reading.component, incident_start, now)
        {
            log::debug!(
                target: self.log.target(),
                "Alert for {} suppressed ({})",
                reading.component,
                self.ledger.policy()
            );
            return DispatchOutcome::Suppressed;
        }

        log::warn!(
            target: self.log.target(),
            "ALERT: {} is {} ({})",
            reading.component,
            severity,
            reading.value
        );

        let notification = Notification::alert(&reading.component, severity, &reading.value, now);
        DispatchOutcome::Dispatched {
            queued: self.fan_out(notification),
        }
    }

    /// Handle a confirmed condition returning to normal
    ///
    /// Recoveries bypass the cooldown and leave the ledger untouched.
    pub fn recover_at(
        &mut self,
        component: &str,
        previous: Severity,
        value: &str,
        now: SystemTime,
    ) -> usize {
        if !self.send_recovery {
            return 0;
        }
        self.fan_out(Notification::recovery(component, previous, value, now))
    }

    /// Queue the notification for every provider that accepts it
    ///
    /// Returns how many jobs were queued.
    pub fn fan_out(&self, notification: Notification) -> usize {
        let notification = Arc::new(notification);
        let mut queued = 0;

        for provider in &self.providers {
            if !provider.should_send(&notification.component, notification.severity) {
                continue;
            }

            let provider = Arc::clone(provider);
            let notification = Arc::clone(&notification);
            let log = self.log.clone();

            let submitted = self.pool.submit(Box::pin(async move {
                if let Err(e) = provider.send(&notification).await {
                    log::error!(
                        target: log.target(),
                        "Failed to send {} alert for {}: {}",
                        provider.name(),
                        notification.component,
                        e
                    );
                }
            }));

            if submitted {
                queued += 1;
            }
        }

        queued
    }

    /// When the component was last announced
    pub fn last_alert(&self, component: &str) -> Option<SystemTime> {
        self.ledger.last_alert(component)
    }

    /// Stop the worker pool, waiting up to `grace` for queued sends
    pub async fn shutdown(self, grace: Duration) {
        self.pool.shutdown(grace).await;
    }
}
