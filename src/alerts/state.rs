//! Debounce state tracking
//!
//! A component is NORMAL (no entry), PENDING (entry, not confirmed) or
//! CONFIRMED (entry, confirmed). An entry is created on the first non-OK
//! reading, replaced whenever the severity changes, and removed on OK.

use super::types::Severity;
use crate::logging::LogHandle;
use std::collections::HashMap;
use std::time::{Duration, SystemTime};

/// Active condition for one component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentState {
    /// Severity currently being tracked
    pub severity: Severity,
    /// When this severity was first seen (incident start)
    pub started_at: SystemTime,
    /// Whether the debounce duration has elapsed
    pub confirmed: bool,
}

/// Outcome of feeding one reading into the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// OK and nothing was tracked
    Normal,
    /// Non-OK, waiting for the debounce duration
    Pending,
    /// Non-OK and alert-worthy on this tick
    Confirmed,
    /// A confirmed condition returned to OK
    Recovered { previous: Severity },
    /// A pending condition returned to OK before confirmation
    Cleared,
}

impl Transition {
    /// Whether this tick should be handed to the dispatcher
    pub fn triggers(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Per-component debounce state machine
///
/// Owns every [`ComponentState`]; nothing else mutates them.
#[derive(Debug)]
pub struct StateTracker {
    states: HashMap<String, ComponentState>,
    log: LogHandle,
}

impl StateTracker {
    pub fn new(log: LogHandle) -> Self {
        Self {
            states: HashMap::new(),
            log,
        }
    }

    /// Process a reading at the current wall-clock time
    ///
    /// Returns true when the condition is confirmed alert-worthy on this tick.
    pub fn process(&mut self, component: &str, severity: Option<Severity>, debounce: Duration) -> bool {
        self.process_at(component, severity, debounce, SystemTime::now())
            .triggers()
    }

    /// Process a reading at an explicit time
    pub fn process_at(
        &mut self,
        component: &str,
        severity: Option<Severity>,
        debounce: Duration,
        now: SystemTime,
    ) -> Transition {
        let Some(severity) = severity else {
            return match self.states.remove(component) {
                Some(state) if state.confirmed => {
                    log::info!(
                        target: self.log.target(),
                        "RECOVERY: {} is back to normal (was {})",
                        component,
                        state.severity
                    );
                    Transition::Recovered {
                        previous: state.severity,
                    }
                }
                Some(_) => Transition::Cleared,
                None => Transition::Normal,
            };
        };

        match self.states.get_mut(component) {
            Some(state) if state.severity == severity => {
                let elapsed = now.duration_since(state.started_at).unwrap_or_default();
                if elapsed >= debounce {
                    state.confirmed = true;
                    Transition::Confirmed
                } else {
                    Transition::Pending
                }
            }
            _ => {
                // New incident, or severity changed: re-time from now
                let confirmed = debounce.is_zero();
                self.states.insert(
                    component.to_string(),
                    ComponentState {
                        severity,
                        started_at: now,
                        confirmed,
                    },
                );

                if confirmed {
                    Transition::Confirmed
                } else {
                    log::debug!(
                        target: self.log.target(),
                        "Detected {} {}, waiting for duration {}s",
                        component,
                        severity,
                        debounce.as_secs()
                    );
                    Transition::Pending
                }
            }
        }
    }

    /// Current state of a component, if it has an active condition
    pub fn get(&self, component: &str) -> Option<&ComponentState> {
        self.states.get(component)
    }

    /// Start time of the component's current incident
    pub fn incident_start(&self, component: &str) -> Option<SystemTime> {
        self.states.get(component).map(|s| s.started_at)
    }

    /// Number of components with an active condition
    pub fn active_count(&self) -> usize {
        self.states.len()
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new(LogHandle::root())
    }
}
