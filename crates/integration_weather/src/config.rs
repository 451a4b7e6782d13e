//! Provider configuration
//!
//! One serde-friendly struct per provider. Every field has a default so a
//! partially specified configuration file still deserializes.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::open_meteo::OpenMeteoModel;

/// Environment variable holding the Met Office Weather DataHub key
pub const MET_OFFICE_API_KEY_ENV: &str = "METOFFICE_API_KEY";

/// Identifying `User-Agent` sent to every provider (NWS rejects anonymous clients)
pub const DEFAULT_USER_AGENT: &str = concat!(
    "weather-relay/",
    env!("CARGO_PKG_VERSION"),
    " (weather-ops@example.org)"
);

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

const fn default_timeout() -> u64 {
    30
}

fn default_nws_base_url() -> String {
    "https://api.weather.gov".to_string()
}

const fn default_grid_cache_capacity() -> u64 {
    10_000
}

fn default_env_canada_base_url() -> String {
    "https://api.weather.gc.ca".to_string()
}

const fn default_search_radius() -> f64 {
    0.5
}

fn default_met_office_base_url() -> String {
    "https://data.hub.api.metoffice.gov.uk/sitespecific/v0".to_string()
}

fn default_open_meteo_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

/// National Weather Service (USA) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NwsConfig {
    /// API base URL (default: <https://api.weather.gov>)
    #[serde(default = "default_nws_base_url")]
    pub base_url: String,

    /// `User-Agent` identifying the application and a contact address
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of coordinate-to-grid lookups kept in memory
    #[serde(default = "default_grid_cache_capacity")]
    pub grid_cache_capacity: u64,
}

impl Default for NwsConfig {
    fn default() -> Self {
        Self {
            base_url: default_nws_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            grid_cache_capacity: default_grid_cache_capacity(),
        }
    }
}

/// Environment Canada configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvCanadaConfig {
    /// MSC GeoMet OGC API base URL (default: <https://api.weather.gc.ca>)
    #[serde(default = "default_env_canada_base_url")]
    pub base_url: String,

    /// `User-Agent` header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Half-width in degrees of the box searched for the nearest forecast site
    #[serde(default = "default_search_radius")]
    pub search_radius_deg: f64,
}

impl Default for EnvCanadaConfig {
    fn default() -> Self {
        Self {
            base_url: default_env_canada_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            search_radius_deg: default_search_radius(),
        }
    }
}

/// Met Office Weather DataHub configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetOfficeConfig {
    /// Site-specific API base URL
    #[serde(default = "default_met_office_base_url")]
    pub base_url: String,

    /// DataHub API key (sensitive, never serialized)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// `User-Agent` header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for MetOfficeConfig {
    fn default() -> Self {
        Self {
            base_url: default_met_office_base_url(),
            api_key: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

impl MetOfficeConfig {
    /// Default configuration with the key taken from `METOFFICE_API_KEY`
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_key()
    }

    /// Fill in the API key from `METOFFICE_API_KEY` when none is configured
    #[must_use]
    pub fn with_env_key(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var(MET_OFFICE_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::from);
        }
        self
    }
}

/// Open-Meteo configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenMeteoConfig {
    /// API base URL (default: <https://api.open-meteo.com/v1>)
    #[serde(default = "default_open_meteo_base_url")]
    pub base_url: String,

    /// Numerical weather model to query
    #[serde(default)]
    pub model: OpenMeteoModel,

    /// `User-Agent` header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            base_url: default_open_meteo_base_url(),
            model: OpenMeteoModel::default(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

impl OpenMeteoConfig {
    /// Same endpoint and timeouts, different model
    #[must_use]
    pub fn with_model(&self, model: OpenMeteoModel) -> Self {
        Self {
            model,
            ..self.clone()
        }
    }
}
