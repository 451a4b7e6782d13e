//! Forecast cache port
//!
//! Stores normalized forecasts for at most [`FORECAST_TTL`]. Expired and
//! absent entries are both reported as a miss.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use domain::{CoordinateKey, GeoLocation, NormalizedDailyForecast};

/// Maximum age of a cached forecast
pub const FORECAST_TTL: Duration = Duration::from_secs(60 * 60);

/// Identity of a cached forecast
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Provider that produced the forecast
    pub provider_id: String,
    /// Coordinates rounded to 4 decimal places
    pub coordinates: CoordinateKey,
    /// Requested day count
    pub days: u8,
    /// Whether alerts were attached
    pub include_alerts: bool,
    /// Whether the forecast was produced as a fallback
    pub fallback: bool,
}

impl CacheKey {
    /// Build a key for a location
    #[must_use]
    pub fn new(
        provider_id: impl Into<String>,
        location: &GeoLocation,
        days: u8,
        include_alerts: bool,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            coordinates: CoordinateKey::from_location(location),
            days,
            include_alerts,
            fallback: false,
        }
    }

    /// Same key, tagged as a fallback entry
    #[must_use]
    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}d:alerts={}:fallback={}",
            self.provider_id, self.coordinates, self.days, self.include_alerts, self.fallback
        )
    }
}

/// Port for the forecast cache
///
/// Implementations must tolerate concurrent readers and writers.
#[async_trait]
pub trait ForecastCachePort: Send + Sync + fmt::Debug {
    /// Get a fresh entry, or `None` when absent or older than the TTL
    async fn get(&self, key: &CacheKey) -> Option<NormalizedDailyForecast>;

    /// Store a forecast, overwriting any existing entry
    async fn set(&self, key: CacheKey, forecast: NormalizedDailyForecast);

    /// Remove a single entry, returning whether it existed
    async fn invalidate(&self, key: &CacheKey) -> bool;

    /// Remove every entry
    async fn clear(&self);

    /// Remove expired entries and return how many were dropped
    async fn cleanup_expired(&self) -> usize;

    /// Number of stored entries, expired or not
    fn len(&self) -> usize;

    /// Whether the cache holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hit/miss counters
    fn stats(&self) -> CacheStats;
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Current number of entries
    pub entries: u64,
}

impl CacheStats {
    /// Calculate the hit rate as a fraction (0.0 - 1.0)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_stats_hit_rate_zero_when_empty() {
        let stats = CacheStats::default();
        assert!(stats.hit_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn cache_stats_hit_rate_calculates_correctly() {
        let stats = CacheStats {
            hits: 75,
            misses: 25,
            entries: 10,
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn ttl_is_one_hour() {
        assert_eq!(FORECAST_TTL, Duration::from_secs(3600));
    }

    #[test]
    fn keys_round_to_four_decimals() {
        let a = GeoLocation::new(46.852_31, -121.760_29).unwrap();
        let b = GeoLocation::new(46.852_34, -121.760_33).unwrap();
        assert_eq!(CacheKey::new("nws", &a, 7, false), CacheKey::new("nws", &b, 7, false));
    }

    #[test]
    fn fallback_flag_changes_identity() {
        let loc = GeoLocation::new(51.5, -0.12).unwrap();
        let primary = CacheKey::new("open_meteo", &loc, 3, false);
        assert_ne!(primary.clone(), primary.as_fallback());
    }

    #[test]
    fn display_includes_every_component() {
        let loc = GeoLocation::new(45.5, -73.5).unwrap();
        let key = CacheKey::new("env_canada", &loc, 2, true);
        assert_eq!(
            key.to_string(),
            "env_canada:45.5000,-73.5000:2d:alerts=true:fallback=false"
        );
    }
}
