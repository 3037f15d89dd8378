//! Periodic task scheduling.
//!
//! [`PeriodicExecutor`] runs a task once immediately and then on a fixed
//! interval until its [`CancellationToken`] is cancelled. Each run is spawned
//! as its own task: a run that outlasts the interval overlaps with the next
//! one. The cadence is advisory, not exclusive.
//!
//! Tasks return nothing. They handle and report their own failures.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{CloudInfoError, Result};

/// Runs a task function periodically in the background.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicExecutor {
    interval: Duration,
}

impl PeriodicExecutor {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start executing `task`.
    ///
    /// The first run is spawned immediately, further runs every `interval`.
    /// Returns the handle of the scheduling loop; the loop stops scheduling
    /// once `cancel` fires. Runs already started are not interrupted.
    ///
    /// Must be called within a tokio runtime.
    pub fn execute<F, Fut>(&self, cancel: CancellationToken, task: F) -> Result<JoinHandle<()>>
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.interval.is_zero() {
            return Err(CloudInfoError::Configuration(
                "periodic execution interval must be non-zero".into(),
            ));
        }

        tokio::spawn(task(cancel.clone()));

        let period = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!(interval = ?period, "stopping periodic execution");
                        break;
                    }
                    _ = ticker.tick() => {
                        tokio::spawn(task(cancel.clone()));
                    }
                }
            }
        });

        Ok(handle)
    }
}
