//! In-memory forecast cache
//!
//! A `RwLock`-guarded map with per-entry creation timestamps. Reads treat
//! anything older than the TTL as a miss and evict it on the spot, so the
//! staleness bound holds even if the sweep task never runs.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use application::ports::{CacheKey, CacheStats, FORECAST_TTL, ForecastCachePort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::NormalizedDailyForecast;
use parking_lot::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
struct CachedForecast {
    forecast: NormalizedDailyForecast,
    created_at: DateTime<Utc>,
}

/// Forecast cache held in process memory
pub struct InMemoryForecastCache {
    entries: RwLock<HashMap<CacheKey, CachedForecast>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for InMemoryForecastCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryForecastCache")
            .field("entries", &self.entries.read().len())
            .field("ttl_secs", &self.ttl.as_secs())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for InMemoryForecastCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryForecastCache {
    /// Create a cache with the standard one-hour TTL
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(FORECAST_TTL)
    }

    /// Create a cache with a custom TTL
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Configured TTL
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store an entry with an explicit creation time
    pub fn insert_at(
        &self,
        key: CacheKey,
        forecast: NormalizedDailyForecast,
        created_at: DateTime<Utc>,
    ) {
        self.entries.write().insert(
            key,
            CachedForecast {
                forecast,
                created_at,
            },
        );
    }

    fn is_expired(&self, entry: &CachedForecast, now: DateTime<Utc>) -> bool {
        // A TTL too large for chrono never expires
        chrono::Duration::from_std(self.ttl).is_ok_and(|ttl| now - entry.created_at >= ttl)
    }
}

#[async_trait]
impl ForecastCachePort for InMemoryForecastCache {
    #[instrument(skip(self, key), fields(key = %key), level = "debug")]
    async fn get(&self, key: &CacheKey) -> Option<NormalizedDailyForecast> {
        let now = Utc::now();
        let found = {
            let entries = self.entries.read();
            entries
                .get(key)
                .map(|entry| (self.is_expired(entry, now), entry.forecast.clone()))
        };

        match found {
            Some((false, forecast)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit");
                Some(forecast)
            },
            Some((true, _)) => {
                self.entries.write().remove(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache entry expired");
                None
            },
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss");
                None
            },
        }
    }

    #[instrument(skip(self, key, forecast), fields(key = %key), level = "debug")]
    async fn set(&self, key: CacheKey, forecast: NormalizedDailyForecast) {
        self.insert_at(key, forecast, Utc::now());
        debug!("Cache set");
    }

    async fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.write().remove(key).is_some()
    }

    async fn clear(&self) {
        self.entries.write().clear();
    }

    async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len() as u64,
        }
    }
}
