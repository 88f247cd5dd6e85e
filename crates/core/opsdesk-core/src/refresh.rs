//! Generic fixed-cadence refresh capability
//!
//! Fixed-interval polling stands in for push delivery. `LiveRefresh`
//! owns the one long-lived resource in the engine that must be torn
//! down explicitly: a leaked loop would keep fetching for a
//! conversation no longer visible. A push transport could replace this
//! without touching the merge or pagination contracts.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Handle to a spawned fixed-cadence repeater
pub struct LiveRefresh {
    handle: JoinHandle<()>,
}

impl LiveRefresh {
    /// Spawn a task running `tick` every `period`
    ///
    /// The first tick fires immediately, so the initial data appears
    /// without waiting a full interval.
    pub fn start<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                tick().await;
            }
        });
        Self { handle }
    }

    /// Stop the repeater
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// Whether the repeater task is still alive
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for LiveRefresh {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
