//! Periodic expiration sweep.

use chrono::Utc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::queue::QueueContainer;

/// Spawn the background task that calls [`QueueContainer::cleanup`] every
/// `interval` until `shutdown` turns `true` or its sender is dropped.
///
/// Returns `None` without spawning when `interval` is zero.
pub fn spawn_sweeper(
    container: QueueContainer,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        info!("Expiration sweeper disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;
        info!(interval_ms = interval.as_millis() as u64, "Expiration sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = container.cleanup(Utc::now());
                    debug!(removed, "Expiration sweep finished");
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                },
            }
        }

        info!("Expiration sweeper stopped");
    }))
}
