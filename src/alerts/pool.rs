//! Bounded worker pool for notification delivery
//!
//! A fixed number of tokio workers drain a bounded queue. Submitting never
//! blocks the evaluation loop: when the queue is full the job is dropped.

use crate::logging::LogHandle;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Default number of concurrent deliveries
pub const DEFAULT_WORKERS: usize = 5;

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// A unit of delivery work
pub type Job = BoxFuture<'static, ()>;

/// Fixed-size pool of delivery workers
pub struct WorkerPool {
    sender: mpsc::Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    log: LogHandle,
}

impl WorkerPool {
    /// Spawn the workers on the current tokio runtime
    pub fn new(workers: usize, capacity: usize, log: LogHandle) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>(capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..workers.max(1))
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                let log = log.clone();
                tokio::spawn(async move {
                    loop {
                        let job = receiver.lock().await.recv().await;
                        let Some(job) = job else { break };

                        // Run in its own task so a panicking provider
                        // cannot take the worker down with it
                        if let Err(e) = tokio::spawn(job).await {
                            log::error!(target: log.target(), "Worker {} job failed: {}", id, e);
                        }
                    }
                })
            })
            .collect();

        Self {
            sender,
            workers,
            log,
        }
    }

    /// Pool with the default worker count and queue capacity
    pub fn with_defaults(log: LogHandle) -> Self {
        Self::new(DEFAULT_WORKERS, DEFAULT_QUEUE_CAPACITY, log)
    }

    /// Queue a job without waiting
    ///
    /// Returns false if the job was dropped.
    pub fn submit(&self, job: Job) -> bool {
        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!(target: self.log.target(), "Notification queue full, dropping job");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::warn!(target: self.log.target(), "Notification queue closed, dropping job");
                false
            }
        }
    }

    /// Number of worker tasks
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stop accepting jobs and wait up to `grace` for queued ones to finish
    pub async fn shutdown(self, grace: Duration) {
        drop(self.sender);

        let drained = futures::future::join_all(self.workers);
        if tokio::time::timeout(grace, drained).await.is_err() {
            log::warn!(
                target: self.log.target(),
                "Pending notifications not delivered within {:?}",
                grace
            );
        }
    }
}
