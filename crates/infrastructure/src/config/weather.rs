//! Provider settings

use integration_weather::{EnvCanadaConfig, MetOfficeConfig, NwsConfig, OpenMeteoConfig};
use serde::{Deserialize, Serialize};

use super::CacheConfig;
use crate::adapters::CircuitBreakerConfig;

/// Weather subsystem configuration
///
/// Each provider section carries its own base URL, user agent and timeout.
/// The Met Office key may be set here or through `METOFFICE_API_KEY`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherAppConfig {
    /// National Weather Service (USA)
    #[serde(default)]
    pub nws: NwsConfig,

    /// Environment Canada
    #[serde(default)]
    pub env_canada: EnvCanadaConfig,

    /// Met Office (UK)
    #[serde(default)]
    pub met_office: MetOfficeConfig,

    /// Open-Meteo; the model field is ignored, models come from the routing table
    #[serde(default)]
    pub open_meteo: OpenMeteoConfig,

    /// Forecast cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Circuit breaker for native providers (disabled when absent)
    #[serde(default)]
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl WeatherAppConfig {
    /// Apply one `User-Agent` to every provider
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.nws.user_agent = user_agent.to_string();
        self.env_canada.user_agent = user_agent.to_string();
        self.met_office.user_agent = user_agent.to_string();
        self.open_meteo.user_agent = user_agent.to_string();
        self
    }

    /// Apply one request timeout to every provider
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.nws.timeout_secs = timeout_secs;
        self.env_canada.timeout_secs = timeout_secs;
        self.met_office.timeout_secs = timeout_secs;
        self.open_meteo.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_to_every_provider() {
        let config = WeatherAppConfig::default()
            .with_user_agent("test-agent (ops@example.org)")
            .with_timeout_secs(5);
        assert_eq!(config.nws.user_agent, "test-agent (ops@example.org)");
        assert_eq!(config.met_office.user_agent, config.open_meteo.user_agent);
        assert_eq!(config.env_canada.timeout_secs, 5);
        assert!(config.circuit_breaker.is_none());
    }
}
