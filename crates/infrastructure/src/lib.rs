//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports over the weather provider clients,
//! provides the in-memory forecast cache, configuration loading, tracing
//! setup and service wiring.

pub mod adapters;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use bootstrap::{OPEN_METEO_COUNTRIES, WeatherRuntime, build_weather_router, build_weather_service};
pub use cache::{DEFAULT_SWEEP_INTERVAL, InMemoryForecastCache, spawn_cache_sweep_task};
pub use config::{AppConfig, CacheConfig, WeatherAppConfig};
pub use telemetry::{TelemetryConfig, TelemetryError, init_tracing};
