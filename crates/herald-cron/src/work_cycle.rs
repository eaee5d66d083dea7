// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic work cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use herald_config::WorkCycleConfig;

/// Running flag and iteration counter of a [`WorkCycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkCycleStatus {
    pub running: bool,
    pub iteration: u64,
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// A background loop that counts and logs an iteration every interval.
pub struct WorkCycle {
    interval: Duration,
    iteration: Arc<AtomicU64>,
    running: Mutex<Option<Running>>,
}

impl WorkCycle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            iteration: Arc::new(AtomicU64::new(0)),
            running: Mutex::new(None),
        }
    }

    pub fn from_config(config: &WorkCycleConfig) -> Self {
        Self::new(Duration::from_secs(config.interval_secs.max(1)))
    }

    /// Starts the loop. The first iteration runs immediately.
    pub async fn start(&self) -> String {
        let mut running = self.running.lock().await;
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return "Work cycle is already running".to_string();
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(self.interval, self.iteration.clone(), cancel.clone()));
        *running = Some(Running { cancel, handle });
        info!(interval = ?self.interval, "work cycle started");
        "Work cycle started".to_string()
    }

    /// Stops the loop and waits for it to finish.
    pub async fn stop(&self) -> String {
        let Some(Running { cancel, handle }) = self.running.lock().await.take() else {
            return "Work cycle is not running".to_string();
        };
        cancel.cancel();
        let _ = handle.await;
        info!("work cycle stopped");
        "Work cycle stopped".to_string()
    }

    pub async fn status(&self) -> WorkCycleStatus {
        let running = self
            .running
            .lock()
            .await
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished());
        WorkCycleStatus {
            running,
            iteration: self.iteration.load(Ordering::Relaxed),
        }
    }
}

async fn run(period: Duration, iteration: Arc<AtomicU64>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let n = iteration.fetch_add(1, Ordering::Relaxed) + 1;
                info!(iteration = n, "work cycle iteration");
            }
        }
    }
    debug!("work cycle loop exited");
}
