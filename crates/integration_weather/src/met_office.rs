//! Met Office Weather DataHub client (UK)
//!
//! Site-specific hourly forecasts. Requires an API key; the free tier is
//! capped at 360 calls per day and carries no warnings feed.

use async_trait::async_trait;
use domain::units::{clamp_percentage, degrees_to_compass, mm_to_cm, mps_to_kmh};
use domain::{GeoLocation, NormalizedDailyForecast, NormalizedForecast, WeatherAlert};
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::{MET_OFFICE_API_KEY_ENV, MetOfficeConfig};
use crate::error::WeatherError;
use crate::http::{build_http_client, read_json, send, validate_location};
use crate::models::parse_datetime;
use crate::provider::{ForecastClient, clamp_days};
use crate::text::DEFAULT_CLOUD_COVER;

const PROVIDER_ID: &str = "met_office";
const PROVIDER_NAME: &str = "Met Office";
const MAX_DAYS: u8 = 7;
const HOURS_PER_DAY: usize = 24;

/// Met Office HTTP client
#[derive(Debug)]
pub struct MetOfficeClient {
    client: Client,
    config: MetOfficeConfig,
    api_key: SecretString,
}

impl MetOfficeClient {
    /// Create a new Met Office client
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Configuration` if no non-blank API key is
    /// configured, or an error if the HTTP client cannot be initialized.
    pub fn new(config: MetOfficeConfig) -> Result<Self, WeatherError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or_else(|| {
                WeatherError::Configuration(format!(
                    "Met Office API key missing: set {MET_OFFICE_API_KEY_ENV}"
                ))
            })?;
        let client = build_http_client(&config.user_agent, config.timeout_secs)?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Create a client with default settings and the key from `METOFFICE_API_KEY`
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Configuration` if the variable is unset or blank.
    pub fn from_env() -> Result<Self, WeatherError> {
        Self::new(MetOfficeConfig::from_env())
    }

    /// Approximate cloud cover (0-100) from visibility in metres
    ///
    /// | visibility | cover |
    /// |------------|-------|
    /// | < 1 km     | 100   |
    /// | < 4 km     | 85    |
    /// | < 10 km    | 65    |
    /// | < 20 km    | 40    |
    /// | < 40 km    | 20    |
    /// | otherwise  | 10    |
    #[must_use]
    pub fn cloud_cover_from_visibility(visibility_m: f64) -> u8 {
        let km = visibility_m / 1000.0;
        if km < 1.0 {
            100
        } else if km < 4.0 {
            85
        } else if km < 10.0 {
            65
        } else if km < 20.0 {
            40
        } else if km < 40.0 {
            20
        } else {
            10
        }
    }

    /// Description for a Met Office significant-weather code
    #[must_use]
    pub const fn describe_weather_code(code: i32) -> &'static str {
        match code {
            -1 => "Trace rain",
            0 => "Clear night",
            1 => "Sunny day",
            2 | 3 => "Partly cloudy",
            5 => "Mist",
            6 => "Fog",
            7 => "Cloudy",
            8 => "Overcast",
            9 | 10 => "Light rain shower",
            11 => "Drizzle",
            12 => "Light rain",
            13 | 14 => "Heavy rain shower",
            15 => "Heavy rain",
            16 | 17 => "Sleet shower",
            18 => "Sleet",
            19 | 20 => "Hail shower",
            21 => "Hail",
            22 | 23 => "Light snow shower",
            24 => "Light snow",
            25 | 26 => "Heavy snow shower",
            27 => "Heavy snow",
            28 | 29 => "Thunder shower",
            30 => "Thunder",
            _ => "Unknown",
        }
    }

    fn normalize_entry(entry: &HourlyEntry) -> Result<NormalizedForecast, WeatherError> {
        let timestamp = parse_datetime(&entry.time)?;
        let mut forecast = NormalizedForecast::new(timestamp, entry.screen_temperature);
        forecast.temperature_min = entry.min_screen_air_temp;
        forecast.temperature_max = entry.max_screen_air_temp;

        forecast.precipitation_probability =
            entry.prob_of_precipitation.map_or(0, clamp_percentage);
        forecast.precipitation_mm = entry.total_precip_amount.unwrap_or(0.0).max(0.0);
        forecast.snowfall_cm = mm_to_cm(entry.total_snow_amount.unwrap_or(0.0).max(0.0));

        forecast.wind_speed_kmh = mps_to_kmh(entry.wind_speed_10m.unwrap_or(0.0));
        forecast.wind_gust_kmh = mps_to_kmh(
            entry
                .wind_gust_speed_10m
                .unwrap_or(0.0)
                .max(entry.wind_speed_10m.unwrap_or(0.0)),
        );
        if let Some(degrees) = entry.wind_direction_from_10m {
            forecast.wind_direction = degrees_to_compass(degrees).to_string();
        }

        forecast.cloud_cover = entry
            .visibility
            .map_or(DEFAULT_CLOUD_COVER, Self::cloud_cover_from_visibility);
        forecast.description = entry
            .significant_weather_code
            .map_or("Unknown", Self::describe_weather_code)
            .to_string();

        Ok(forecast)
    }
}

#[async_trait]
impl ForecastClient for MetOfficeClient {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn supports_alerts(&self) -> bool {
        false
    }

    fn max_forecast_days(&self) -> u8 {
        MAX_DAYS
    }

    #[instrument(skip(self), fields(provider = PROVIDER_ID, location = %location, days = days))]
    async fn get_forecast(
        &self,
        location: &GeoLocation,
        days: u8,
    ) -> Result<NormalizedDailyForecast, WeatherError> {
        validate_location(location)?;
        let days = clamp_days(days, MAX_DAYS);

        let url = format!("{}/point/hourly", self.config.base_url);
        debug!(url = %url, "Fetching Met Office hourly forecast");

        let request = self
            .client
            .get(&url)
            .query(&[
                ("latitude", format!("{:.4}", location.latitude())),
                ("longitude", format!("{:.4}", location.longitude())),
                ("excludeParameterMetadata", "true".to_string()),
            ])
            .header("apikey", self.api_key.expose_secret())
            .header(header::ACCEPT, "application/json");
        let response: HourlyResponse =
            read_json(send(request, self.config.timeout_secs).await?).await?;

        let feature = response.features.into_iter().next().ok_or_else(|| {
            WeatherError::ParseError("Met Office response contained no features".to_string())
        })?;

        let periods = feature
            .properties
            .time_series
            .iter()
            .take(usize::from(days) * HOURS_PER_DAY)
            .map(Self::normalize_entry)
            .collect::<Result<Vec<_>, _>>()?;

        if periods.is_empty() {
            return Err(WeatherError::ParseError(
                "Met Office time series was empty".to_string(),
            ));
        }

        Ok(NormalizedDailyForecast::new(
            PROVIDER_NAME,
            PROVIDER_ID,
            location,
            periods,
        ))
    }

    async fn get_alerts(&self, _location: &GeoLocation) -> Result<Vec<WeatherAlert>, WeatherError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    #[serde(default)]
    features: Vec<HourlyFeature>,
}

#[derive(Debug, Deserialize)]
struct HourlyFeature {
    properties: HourlyProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HourlyProperties {
    #[serde(default)]
    time_series: Vec<HourlyEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HourlyEntry {
    time: String,
    screen_temperature: f64,
    max_screen_air_temp: Option<f64>,
    min_screen_air_temp: Option<f64>,
    #[serde(rename = "windSpeed10m")]
    wind_speed_10m: Option<f64>,
    #[serde(rename = "windDirectionFrom10m")]
    wind_direction_from_10m: Option<f64>,
    #[serde(rename = "windGustSpeed10m")]
    wind_gust_speed_10m: Option<f64>,
    visibility: Option<f64>,
    significant_weather_code: Option<i32>,
    total_precip_amount: Option<f64>,
    total_snow_amount: Option<f64>,
    prob_of_precipitation: Option<f64>,
}
