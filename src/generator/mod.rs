//! Periodic load production.
//!
//! The generator is the one asynchronous element of the simulator: a timer
//! loop that grows an observed user count by a fixed step each tick and
//! pushes it into the mediator. The mediator sits behind a single async
//! mutex, so routing never overlaps a topology mutation; cancellation is
//! observed between ticks and an in-flight update always completes.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::mediator::TopologyMediator;

/// Pacing of the load generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Users added per tick
    pub step: u64,

    /// Stop once the user count reaches this ceiling
    pub limit: u64,

    /// Delay between ticks
    pub interval: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            step: 5000,
            limit: 200_000,
            interval: Duration::from_millis(10),
        }
    }
}

/// Spawned timer loop feeding user counts into the mediator
pub struct LoadGenerator {
    mediator: Arc<Mutex<TopologyMediator>>,
    config: GeneratorConfig,
}

impl LoadGenerator {
    pub fn new(mediator: Arc<Mutex<TopologyMediator>>, config: GeneratorConfig) -> Self {
        Self { mediator, config }
    }

    /// Spawn the tick loop; the returned handle cancels and joins it
    pub fn start(self) -> GeneratorHandle {
        let (shutdown, mut cancelled) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.interval);
            // The first tick of a tokio interval fires immediately; skip it
            // so every update is spaced by the configured delay.
            interval.tick().await;

            let mut users: u64 = 0;
            while users < self.config.limit {
                tokio::select! {
                    _ = interval.tick() => {
                        users = (users + self.config.step).min(self.config.limit);
                        self.mediator.lock().await.update(users);
                        debug!("generated load for {users} users");
                    }
                    changed = cancelled.changed() => {
                        if changed.is_err() || *cancelled.borrow() {
                            info!("load generator cancelled at {users} users");
                            break;
                        }
                    }
                }
            }
        });
        GeneratorHandle { shutdown, task }
    }
}

/// Control handle for a running generator
pub struct GeneratorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl GeneratorHandle {
    /// Stop producing further ticks; an in-flight update still completes
    pub fn cancel(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Wait for the loop to finish (limit reached or cancelled)
    pub async fn join(self) {
        let _ = self.task.await;
    }
}
