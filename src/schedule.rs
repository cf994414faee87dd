//! Fixed-interval background tasks with an explicit stop handle
//!
//! A task runs its tick to completion, then waits for the next interval or
//! the stop signal, whichever comes first. Stopping never interrupts a tick.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A cooperative stop signal shared between a task and its owner.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Signal the task to stop after its current tick.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Resolve once `stop` has been called.
    pub async fn stopped(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// A spawned interval task and the means to tear it down.
#[derive(Debug)]
pub struct BackgroundTask {
    name: &'static str,
    stop: StopHandle,
    join: JoinHandle<()>,
}

impl BackgroundTask {
    /// Spawn `tick` every `interval` on the current tokio runtime.
    ///
    /// The first tick fires after one full interval.
    pub fn spawn<F, Fut>(name: &'static str, interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let stop = StopHandle::new();
        let signal = stop.clone();
        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = signal.stopped() => break,
                    _ = ticker.tick() => tick().await,
                }
            }
            tracing::debug!(task = name, "background task stopped");
        });

        Self { name, stop, join }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// A clone of the stop handle, for signalling from elsewhere
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signal stop and wait for the task to exit.
    pub async fn stop(self) {
        self.stop.stop();
        if let Err(e) = self.join.await {
            tracing::warn!(task = self.name, error = %e, "background task ended abnormally");
        }
    }
}
