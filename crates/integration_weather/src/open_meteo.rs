//! Open-Meteo client
//!
//! Client for the Open-Meteo Weather API (<https://open-meteo.com>). One
//! client targets one numerical model; the same HTTP adapter serves as the
//! primary source for several countries and as the universal fallback.
//! No API key is required.

use async_trait::async_trait;
use domain::units::{clamp_percentage, degrees_to_compass};
use domain::{CountryCode, GeoLocation, NormalizedDailyForecast, NormalizedForecast, WeatherAlert};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::OpenMeteoConfig;
use crate::error::WeatherError;
use crate::http::{build_http_client, read_json, send, validate_location};
use crate::models::{WeatherCondition, parse_datetime};
use crate::provider::{ForecastClient, clamp_days};

const MAX_DAYS: u8 = 16;

const HOURLY_VARIABLES: &str = "temperature_2m,precipitation_probability,precipitation,snowfall,\
     wind_speed_10m,wind_gusts_10m,wind_direction_10m,cloud_cover,freezing_level_height,\
     weather_code";

/// Numerical weather model served by Open-Meteo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMeteoModel {
    /// Automatic best-model selection for the location
    #[default]
    BestMatch,
    /// Météo-France AROME/ARPEGE
    MeteoFrance,
    /// DWD ICON-EU (~7 km over Europe)
    DwdIconEu,
}

impl OpenMeteoModel {
    /// API path segment for this model
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::BestMatch => "forecast",
            Self::MeteoFrance => "meteofrance",
            Self::DwdIconEu => "dwd-icon",
        }
    }

    /// Value for the `models` query parameter, when the endpoint needs one
    #[must_use]
    pub const fn models_param(self) -> Option<&'static str> {
        match self {
            Self::DwdIconEu => Some("icon_eu"),
            Self::BestMatch | Self::MeteoFrance => None,
        }
    }

    /// Stable identifier used in cache keys
    #[must_use]
    pub const fn provider_id(self) -> &'static str {
        match self {
            Self::BestMatch => "open_meteo",
            Self::MeteoFrance => "open_meteo_meteofrance",
            Self::DwdIconEu => "open_meteo_icon_eu",
        }
    }

    /// Display name
    #[must_use]
    pub const fn provider_name(self) -> &'static str {
        match self {
            Self::BestMatch => "Open-Meteo",
            Self::MeteoFrance => "Open-Meteo (Météo-France)",
            Self::DwdIconEu => "Open-Meteo (DWD ICON-EU)",
        }
    }
}

/// Model used when Open-Meteo serves `country` as its primary source
///
/// Switzerland shares ICON-EU with Italy: Open-Meteo has no Swiss-specific
/// endpoint. Outside Europe the automatic selection is preferred.
#[must_use]
pub fn model_for_country(country: &CountryCode) -> OpenMeteoModel {
    match country.as_str() {
        "FR" => OpenMeteoModel::MeteoFrance,
        "CH" | "IT" => OpenMeteoModel::DwdIconEu,
        _ => OpenMeteoModel::BestMatch,
    }
}

/// Open-Meteo HTTP client implementation
#[derive(Debug)]
pub struct OpenMeteoClient {
    client: Client,
    config: OpenMeteoConfig,
}

impl OpenMeteoClient {
    /// Create a new Open-Meteo client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: OpenMeteoConfig) -> Result<Self, WeatherError> {
        let client = build_http_client(&config.user_agent, config.timeout_secs)?;
        Ok(Self { client, config })
    }

    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_defaults() -> Result<Self, WeatherError> {
        Self::new(OpenMeteoConfig::default())
    }

    /// The model this client queries
    #[must_use]
    pub const fn model(&self) -> OpenMeteoModel {
        self.config.model
    }

    fn query_params(&self, location: &GeoLocation, days: u8) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("latitude", format!("{:.4}", location.latitude())),
            ("longitude", format!("{:.4}", location.longitude())),
            ("hourly", HOURLY_VARIABLES.to_string()),
            ("wind_speed_unit", "kmh".to_string()),
            ("timezone", "UTC".to_string()),
            ("forecast_days", days.to_string()),
        ];
        if let Some(models) = self.config.model.models_param() {
            params.push(("models", models.to_string()));
        }
        params
    }

    fn parse_hourly(hourly: &HourlyData) -> Result<Vec<NormalizedForecast>, WeatherError> {
        let mut periods = Vec::with_capacity(hourly.time.len());

        for (i, time) in hourly.time.iter().enumerate() {
            let Some(temperature) = value_at(&hourly.temperature_2m, i) else {
                continue;
            };
            let mut forecast = NormalizedForecast::new(parse_datetime(time)?, temperature);

            forecast.precipitation_probability =
                value_at(&hourly.precipitation_probability, i).map_or(0, clamp_percentage);
            forecast.precipitation_mm = value_at(&hourly.precipitation, i).unwrap_or(0.0);
            forecast.snowfall_cm = value_at(&hourly.snowfall, i).unwrap_or(0.0);
            forecast.wind_speed_kmh = value_at(&hourly.wind_speed_10m, i).unwrap_or(0.0);
            forecast.wind_gust_kmh = value_at(&hourly.wind_gusts_10m, i)
                .unwrap_or(0.0)
                .max(forecast.wind_speed_kmh);
            if let Some(degrees) = value_at(&hourly.wind_direction_10m, i) {
                forecast.wind_direction = degrees_to_compass(degrees).to_string();
            }
            forecast.cloud_cover = value_at(&hourly.cloud_cover, i).map_or(0, clamp_percentage);
            forecast.freezing_level_m = value_at(&hourly.freezing_level_height, i);
            forecast.description = hourly
                .weather_code
                .get(i)
                .copied()
                .flatten()
                .map_or(WeatherCondition::Unknown, WeatherCondition::from_wmo_code)
                .description()
                .to_string();

            periods.push(forecast);
        }

        Ok(periods)
    }
}

fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

#[async_trait]
impl ForecastClient for OpenMeteoClient {
    fn provider_id(&self) -> &'static str {
        self.config.model.provider_id()
    }

    fn provider_name(&self) -> &'static str {
        self.config.model.provider_name()
    }

    fn supports_alerts(&self) -> bool {
        false
    }

    fn max_forecast_days(&self) -> u8 {
        MAX_DAYS
    }

    #[instrument(skip(self), fields(model = ?self.config.model, location = %location, days = days))]
    async fn get_forecast(
        &self,
        location: &GeoLocation,
        days: u8,
    ) -> Result<NormalizedDailyForecast, WeatherError> {
        validate_location(location)?;
        let days = clamp_days(days, MAX_DAYS);

        let url = format!("{}/{}", self.config.base_url, self.config.model.endpoint());
        debug!(url = %url, "Fetching Open-Meteo forecast");

        let request = self
            .client
            .get(&url)
            .query(&self.query_params(location, days));
        let response: ApiResponse =
            read_json(send(request, self.config.timeout_secs).await?).await?;

        let hourly = response.hourly.ok_or_else(|| {
            WeatherError::ParseError("No hourly forecast data in response".to_string())
        })?;
        let periods = Self::parse_hourly(&hourly)?;
        if periods.is_empty() {
            return Err(WeatherError::ParseError(
                "Open-Meteo returned no usable hours".to_string(),
            ));
        }

        Ok(NormalizedDailyForecast::new(
            self.provider_name(),
            self.provider_id(),
            location,
            periods,
        ))
    }

    async fn get_alerts(&self, _location: &GeoLocation) -> Result<Vec<WeatherAlert>, WeatherError> {
        Ok(Vec::new())
    }
}

/// Raw API response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    hourly: Option<HourlyData>,
}

/// Raw hourly arrays; models omit variables they do not produce
#[derive(Debug, Deserialize)]
struct HourlyData {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    snowfall: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_gusts_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_direction_10m: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
    #[serde(default)]
    freezing_level_height: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<u8>>,
}
