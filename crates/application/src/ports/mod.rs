//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod forecast_cache_port;
mod weather_provider_port;

pub use forecast_cache_port::{CacheKey, CacheStats, FORECAST_TTL, ForecastCachePort};
#[cfg(test)]
pub use weather_provider_port::MockWeatherProviderPort;
pub use weather_provider_port::WeatherProviderPort;
