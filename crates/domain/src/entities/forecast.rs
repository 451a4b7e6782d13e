//! Normalized forecast entities
//!
//! Every provider produces these types. All numeric fields are metric:
//! degrees Celsius, millimetres of precipitation, centimetres of snow,
//! km/h for wind and metres for the freezing level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::WeatherAlert;
use crate::value_objects::GeoLocation;

/// Forecast for a single time period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedForecast {
    /// Start of the period (UTC)
    pub timestamp: DateTime<Utc>,
    /// Representative temperature in Celsius
    pub temperature: f64,
    /// Minimum temperature of the period, when the source reports a range
    pub temperature_min: Option<f64>,
    /// Maximum temperature of the period, when the source reports a range
    pub temperature_max: Option<f64>,
    /// Precipitation probability (0-100)
    pub precipitation_probability: u8,
    /// Precipitation amount in mm
    pub precipitation_mm: f64,
    /// Snowfall in cm
    pub snowfall_cm: f64,
    /// Average wind speed in km/h
    pub wind_speed_kmh: f64,
    /// Wind gust in km/h
    pub wind_gust_kmh: f64,
    /// 16-point compass direction the wind blows from
    pub wind_direction: String,
    /// Cloud cover (0-100)
    pub cloud_cover: u8,
    /// Freezing-level height in metres
    pub freezing_level_m: Option<f64>,
    /// Short human-readable description
    pub description: String,
}

impl NormalizedForecast {
    /// Create a period with the given time and temperature and calm, dry defaults
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, temperature: f64) -> Self {
        Self {
            timestamp,
            temperature,
            temperature_min: None,
            temperature_max: None,
            precipitation_probability: 0,
            precipitation_mm: 0.0,
            snowfall_cm: 0.0,
            wind_speed_kmh: 0.0,
            wind_gust_kmh: 0.0,
            wind_direction: "N".to_string(),
            cloud_cover: 0,
            freezing_level_m: None,
            description: String::new(),
        }
    }

    /// Lowest temperature this period covers
    #[must_use]
    pub fn low(&self) -> f64 {
        self.temperature_min.unwrap_or(self.temperature)
    }

    /// Highest temperature this period covers
    #[must_use]
    pub fn high(&self) -> f64 {
        self.temperature_max.unwrap_or(self.temperature)
    }
}

/// The unit returned to callers: an ordered forecast plus its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDailyForecast {
    /// Chronologically ordered periods
    pub periods: Vec<NormalizedForecast>,
    /// Human-readable source name, e.g. "National Weather Service"
    pub provider: String,
    /// Stable provider identifier used for caching
    pub provider_id: String,
    /// True only when the preferred native provider failed and Open-Meteo substituted
    pub is_fallback: bool,
    /// Requested latitude
    pub latitude: f64,
    /// Requested longitude
    pub longitude: f64,
    /// When this forecast was assembled
    pub generated_at: DateTime<Utc>,
    /// Active alerts, only populated for requests that asked for them
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}

impl NormalizedDailyForecast {
    /// Create a primary (non-fallback) forecast for a location
    #[must_use]
    pub fn new(
        provider: impl Into<String>,
        provider_id: impl Into<String>,
        location: &GeoLocation,
        periods: Vec<NormalizedForecast>,
    ) -> Self {
        Self {
            periods,
            provider: provider.into(),
            provider_id: provider_id.into(),
            is_fallback: false,
            latitude: location.latitude(),
            longitude: location.longitude(),
            generated_at: Utc::now(),
            alerts: Vec::new(),
        }
    }

    /// Mark this forecast as produced by the fallback provider
    #[must_use]
    pub fn as_fallback(mut self) -> Self {
        self.is_fallback = true;
        self
    }

    /// Attach alerts to this forecast
    #[must_use]
    pub fn with_alerts(mut self, alerts: Vec<WeatherAlert>) -> Self {
        self.alerts = alerts;
        self
    }

    /// Display label: "<Provider Name>" or "<Provider Name> (fallback)"
    #[must_use]
    pub fn data_source(&self) -> String {
        if self.is_fallback {
            format!("{} (fallback)", self.provider)
        } else {
            self.provider.clone()
        }
    }

    /// Number of periods
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Whether the forecast has no periods
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Iterate over the periods in chronological order
    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedForecast> {
        self.periods.iter()
    }
}

impl<'a> IntoIterator for &'a NormalizedDailyForecast {
    type Item = &'a NormalizedForecast;
    type IntoIter = std::slice::Iter<'a, NormalizedForecast>;

    fn into_iter(self) -> Self::IntoIter {
        self.periods.iter()
    }
}
