//! Alert pipeline
//!
//! Readings are debounced per component by the state tracker, deduplicated
//! by the dispatcher and fanned out to notification providers through a
//! bounded worker pool.

pub mod dispatcher;
pub mod notifier;
pub mod pool;
pub mod providers;
pub mod routing;
pub mod state;
pub mod types;

pub use dispatcher::{AlertLedger, CooldownPolicy, DispatchOutcome, Dispatcher};
pub use notifier::{build_providers, Notifier, ProviderKind};
pub use pool::WorkerPool;
pub use routing::RoutingFilter;
pub use state::{StateTracker, Transition};
pub use types::{Notification, NotificationKind, Reading, Severity};
