//! Expiry Sweep Task
//!
//! Reads already treat expired entries as absent; this task reclaims their
//! memory in the in-process tier.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::backend::LocalBackend;

/// Shortest pause between sweeps; each sweep takes the store's write lock.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Spawns a background task that periodically drops expired entries from
/// `local`.
///
/// # Arguments
/// * `local` - Handle to the in-process tier
/// * `interval` - Time between sweeps, raised to at least one second
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_cleanup_task(local: LocalBackend, interval: Duration) -> JoinHandle<()> {
    let interval = interval.max(MIN_INTERVAL);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = local.cleanup_expired().await;

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
