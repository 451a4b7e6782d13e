//! Forecast cache implementations
//!
//! - `InMemoryForecastCache`: process-local map with a fixed TTL
//! - `spawn_cache_sweep_task`: periodic eviction of expired entries

mod forecast_cache;
mod sweep;

pub use forecast_cache::InMemoryForecastCache;
pub use sweep::{DEFAULT_SWEEP_INTERVAL, spawn_cache_sweep_task};
