//! Periodic removal of expired forecasts

use std::sync::Arc;
use std::time::Duration;

use application::ports::ForecastCachePort;
use tracing::{debug, info};

/// Default sweep interval: every 10 minutes
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Spawn a background task that drops expired cache entries.
///
/// The first sweep happens one interval after startup. Returns a
/// `JoinHandle` that can be used to abort the task when shutting down.
pub fn spawn_cache_sweep_task(
    cache: Arc<dyn ForecastCachePort>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    info!(interval_secs = interval.as_secs(), "Starting forecast cache sweep task");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                info!(removed_count = removed, remaining = cache.len(), "Swept expired forecasts");
            } else {
                debug!("No expired forecasts to sweep");
            }
        }
    })
}
