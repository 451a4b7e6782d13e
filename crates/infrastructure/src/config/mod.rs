//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `config.toml`, then `FORECAST_`-prefixed environment variables using
//! `__` between nested keys (e.g. `FORECAST_WEATHER__NWS__TIMEOUT_SECS`).
//!
//! - `weather`: provider endpoints, cache and circuit breaker settings
//! - `telemetry`: log filter and output format

mod cache;
mod weather;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use cache::CacheConfig;
pub use weather::WeatherAppConfig;

use crate::telemetry::TelemetryConfig;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "FORECAST";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Weather providers, cache and resilience
    #[serde(default)]
    pub weather: WeatherAppConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or a value has the
    /// wrong type.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::build(config::File::with_name("config").required(false))
    }

    /// Load configuration from an explicit file and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or invalid.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::build(config::File::from(path).required(true))
    }

    /// Parse configuration from a TOML document, ignoring the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the document is invalid.
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn build<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        debug!(
            nws = %loaded.weather.nws.base_url,
            open_meteo = %loaded.weather.open_meteo.base_url,
            cache_ttl_secs = loaded.weather.cache.ttl().as_secs(),
            "Configuration loaded"
        );
        Ok(loaded)
    }
}
