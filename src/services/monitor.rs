//! Evaluation loop
//!
//! One tick runs every metric source in order, feeds each reading through
//! the state tracker and hands confirmed readings to the dispatcher. Only
//! notification delivery leaves this loop.

use crate::alerts::dispatcher::{CooldownPolicy, DispatchOutcome, Dispatcher};
use crate::alerts::notifier::{build_providers, Notifier};
use crate::alerts::pool::{WorkerPool, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
use crate::alerts::state::{StateTracker, Transition};
use crate::config::Config;
use crate::error::AppError;
use crate::logging::LogHandle;
use crate::metrics::{build_sources, MetricSource};

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::MissedTickBehavior;

/// Configuration for the monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between ticks
    pub interval: Duration,
    /// Deduplication policy for repeated alerts
    pub cooldown: CooldownPolicy,
    /// Notify when a confirmed condition clears
    pub send_recovery: bool,
    /// Concurrent notification deliveries
    pub workers: usize,
    /// Pending notification capacity
    pub queue_capacity: usize,
    /// How long to wait for queued notifications on shutdown
    pub shutdown_grace: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            cooldown: CooldownPolicy::FixedCooldown(Duration::from_secs(60)),
            send_recovery: false,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl From<&Config> for MonitorConfig {
    fn from(config: &Config) -> Self {
        Self {
            interval: config.refresh_interval(),
            cooldown: config.cooldown_policy(),
            send_recovery: config.alerts.send_recovery,
            ..Self::default()
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub readings: usize,
    pub dispatched: usize,
    pub suppressed: usize,
    pub recoveries: usize,
    /// Sources skipped because of a collection fault
    pub faults: usize,
}

/// Host monitor
pub struct Monitor {
    config: MonitorConfig,
    sources: Vec<Box<dyn MetricSource>>,
    tracker: StateTracker,
    dispatcher: Dispatcher,
    log: LogHandle,
}

impl Monitor {
    /// Create a monitor; must be called inside a tokio runtime
    pub fn new(
        config: MonitorConfig,
        sources: Vec<Box<dyn MetricSource>>,
        providers: Vec<Arc<dyn Notifier>>,
        log: LogHandle,
    ) -> Self {
        let pool = WorkerPool::new(config.workers, config.queue_capacity, log.child("pool"));
        let dispatcher = Dispatcher::new(
            config.cooldown,
            providers,
            pool,
            config.send_recovery,
            log.child("dispatcher"),
        );

        Self {
            tracker: StateTracker::new(log.child("state")),
            config,
            sources,
            dispatcher,
            log,
        }
    }

    /// Build sources and providers from the loaded configuration
    pub fn from_config(config: &Config, log: LogHandle) -> Self {
        let sources = build_sources(config);
        let providers = build_providers(&config.alerts, &log.child("alerts"));

        if providers.is_empty() {
            log::warn!(target: log.target(), "No alert providers enabled; alerts will only be logged");
        }
        log::info!(
            target: log.target(),
            "Monitoring {} source(s), {} provider(s), {}",
            sources.len(),
            providers.len(),
            config.cooldown_policy()
        );

        Self::new(MonitorConfig::from(config), sources, providers, log)
    }

    /// Run one tick now
    pub fn tick(&mut self) -> TickSummary {
        self.tick_at(SystemTime::now())
    }

    /// Run one tick at an explicit time
    pub fn tick_at(&mut self, now: SystemTime) -> TickSummary {
        let mut summary = TickSummary::default();

        for source in &mut self.sources {
            let debounce = source.debounce();
            let readings = match catch_unwind(AssertUnwindSafe(|| source.check())) {
                Ok(Ok(readings)) => readings,
                Ok(Err(e)) => {
                    log::error!(target: self.log.target(), "Error checking {}: {}", source.name(), e);
                    summary.faults += 1;
                    continue;
                }
                Err(_) => {
                    log::error!(target: self.log.target(), "Source {} panicked", source.name());
                    summary.faults += 1;
                    continue;
                }
            };

            for reading in readings {
                summary.readings += 1;
                log::debug!(
                    target: self.log.target(),
                    "{}: {} ({})",
                    reading.component,
                    reading.value,
                    reading.severity.map_or("OK", |s| s.as_str())
                );

                match self
                    .tracker
                    .process_at(&reading.component, reading.severity, debounce, now)
                {
                    Transition::Confirmed => {
                        let start = self.tracker.incident_start(&reading.component);
                        match self.dispatcher.trigger_at(&reading, start, now) {
                            DispatchOutcome::Dispatched { .. } => summary.dispatched += 1,
                            DispatchOutcome::Suppressed => summary.suppressed += 1,
                        }
                    }
                    Transition::Recovered { previous } => {
                        summary.recoveries += 1;
                        self.dispatcher
                            .recover_at(&reading.component, previous, &reading.value, now);
                    }
                    Transition::Normal | Transition::Pending | Transition::Cleared => {}
                }
            }
        }

        summary
    }

    /// Tick every interval until interrupted, then drain the worker pool
    pub async fn run(mut self) -> Result<(), AppError> {
        log::info!(
            target: self.log.target(),
            "TinyMonitor started (refresh every {}s)",
            self.config.interval.as_secs()
        );

        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = shutdown_signal(self.log.clone());
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!(target: self.log.target(), "Shutdown requested, stopping monitor");
                    break;
                }
                _ = interval.tick() => {
                    self.tick();
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Stop the worker pool, waiting briefly for queued notifications
    pub async fn shutdown(self) {
        self.dispatcher.shutdown(self.config.shutdown_grace).await;
    }

    /// Number of components with an active condition
    pub fn active_conditions(&self) -> usize {
        self.tracker.active_count()
    }

    /// Get the monitor configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}

/// Resolve on Ctrl-C or SIGTERM
async fn shutdown_signal(log: LogHandle) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!(target: log.target(), "Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!(target: log.target(), "Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
