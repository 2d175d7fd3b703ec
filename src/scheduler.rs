//! Cancellable periodic tasks
//!
//! Thin wrapper over a spawned `tokio::time::interval` loop. Each owner
//! keeps the handle and cancels it synchronously during teardown, so a tick
//! can never fire into a session that has already been reset; a tick queued
//! before cancellation is discarded by the receiver's phase guard.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::trace;

/// A periodic task that stops when cancelled or dropped
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawn a task invoking `tick` every `period`, first fire after one
    /// full period
    pub fn spawn<F>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                trace!("periodic task '{}' tick", name);
                tick();
            }
        });
        Self { name, handle }
    }

    /// Task name, for teardown logging
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop the task immediately
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
