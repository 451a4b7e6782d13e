//! National Weather Service (USA) client
//!
//! Two-step protocol against <https://api.weather.gov>: `/points/{lat},{lon}`
//! resolves a coordinate to a forecast office grid cell, then the returned
//! forecast URL yields half-day periods in imperial units and prose.
//! Grid lookups never change for a coordinate and are cached for the
//! lifetime of the client.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain::units::{clamp_percentage, fahrenheit_to_celsius, inches_to_cm, mph_to_kmh};
use domain::{
    AlertSeverity, CoordinateKey, GeoLocation, NormalizedDailyForecast, NormalizedForecast,
    WeatherAlert,
};
use moka::future::Cache;
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::NwsConfig;
use crate::error::WeatherError;
use crate::http::{build_http_client, read_json, send, validate_location};
use crate::models::parse_datetime;
use crate::provider::{ForecastClient, clamp_days};
use crate::text::{
    cloud_cover_from_text, parse_gust, parse_precipitation_chance, parse_snow_accumulation_inches,
    parse_wind_speed,
};

const PROVIDER_ID: &str = "nws";
const PROVIDER_NAME: &str = "National Weather Service";
const MAX_DAYS: u8 = 7;
const GEO_JSON: &str = "application/geo+json";

/// Grid cell metadata returned by the points lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridInfo {
    /// Forecast office identifier, e.g. `SEW`
    pub office: String,
    /// Grid X index
    pub grid_x: u32,
    /// Grid Y index
    pub grid_y: u32,
    /// Absolute URL of the period forecast for this cell
    pub forecast_url: String,
}

/// NWS HTTP client
#[derive(Debug)]
pub struct NwsClient {
    client: Client,
    config: NwsConfig,
    grid_cache: Cache<CoordinateKey, GridInfo>,
}

impl NwsClient {
    /// Create a new NWS client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: NwsConfig) -> Result<Self, WeatherError> {
        let client = build_http_client(&config.user_agent, config.timeout_secs)?;
        let grid_cache = Cache::builder()
            .max_capacity(config.grid_cache_capacity)
            .build();

        Ok(Self {
            client,
            config,
            grid_cache,
        })
    }

    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_defaults() -> Result<Self, WeatherError> {
        Self::new(NwsConfig::default())
    }

    /// Resolve a location to its grid cell, consulting the grid cache first
    ///
    /// Concurrent lookups for the same rounded coordinate share one request.
    pub async fn grid_info(&self, location: &GeoLocation) -> Result<GridInfo, WeatherError> {
        let key = CoordinateKey::from(location);
        self.grid_cache
            .try_get_with(key, self.fetch_grid_info(key))
            .await
            .map_err(|e: Arc<WeatherError>| e.as_ref().clone())
    }

    async fn fetch_grid_info(&self, key: CoordinateKey) -> Result<GridInfo, WeatherError> {
        let url = format!("{}/points/{key}", self.config.base_url);
        debug!(url = %url, "Resolving NWS grid point");

        let request = self.client.get(&url).header(header::ACCEPT, GEO_JSON);
        let response = send(request, self.config.timeout_secs).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Self::out_of_coverage(key));
        }

        let points: PointsResponse = read_json(response).await?;
        let forecast_url = points
            .properties
            .forecast
            .ok_or_else(|| Self::out_of_coverage(key))?;

        Ok(GridInfo {
            office: points.properties.grid_id,
            grid_x: points.properties.grid_x,
            grid_y: points.properties.grid_y,
            forecast_url,
        })
    }

    fn out_of_coverage(key: CoordinateKey) -> WeatherError {
        WeatherError::OutOfCoverage {
            provider: PROVIDER_NAME,
            latitude: key.latitude(),
            longitude: key.longitude(),
        }
    }

    fn normalize_period(period: &ForecastPeriod) -> Result<NormalizedForecast, WeatherError> {
        let timestamp = parse_datetime(&period.start_time)?;
        let temperature = if period.temperature_unit.eq_ignore_ascii_case("F") {
            fahrenheit_to_celsius(period.temperature)
        } else {
            period.temperature
        };

        let mut forecast = NormalizedForecast::new(timestamp, temperature);
        if period.is_daytime {
            forecast.temperature_max = Some(temperature);
        } else {
            forecast.temperature_min = Some(temperature);
        }

        if let Some((low, high)) = parse_wind_speed(&period.wind_speed) {
            forecast.wind_speed_kmh = mph_to_kmh(f64::midpoint(low, high));
            let gust = parse_gust(&period.detailed_forecast).unwrap_or(high);
            forecast.wind_gust_kmh = mph_to_kmh(gust.max(high));
        }
        if !period.wind_direction.trim().is_empty() {
            forecast.wind_direction = period.wind_direction.trim().to_string();
        }

        let text = format!("{}. {}", period.short_forecast, period.detailed_forecast);
        forecast.precipitation_probability = period
            .probability_of_precipitation
            .as_ref()
            .and_then(|p| p.value)
            .map_or_else(|| parse_precipitation_chance(&text), clamp_percentage);

        forecast.snowfall_cm = parse_snow_accumulation_inches(&period.detailed_forecast)
            .map_or(0.0, inches_to_cm);
        forecast.cloud_cover = cloud_cover_from_text(&period.short_forecast);
        forecast.description.clone_from(&period.short_forecast);

        Ok(forecast)
    }

    /// Map an NWS CAP severity onto the shared scale
    #[must_use]
    pub fn map_severity(severity: &str) -> AlertSeverity {
        match severity.to_ascii_lowercase().as_str() {
            "extreme" | "severe" => AlertSeverity::Severe,
            "moderate" => AlertSeverity::Moderate,
            _ => AlertSeverity::Minor,
        }
    }
}

#[async_trait]
impl ForecastClient for NwsClient {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn supports_alerts(&self) -> bool {
        true
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

        let grid = self.grid_info(location).await?;
        debug!(office = %grid.office, x = grid.grid_x, y = grid.grid_y, "Fetching NWS forecast");

        let request = self
            .client
            .get(&grid.forecast_url)
            .header(header::ACCEPT, GEO_JSON);
        let response: ForecastResponse =
            read_json(send(request, self.config.timeout_secs).await?).await?;

        let periods = response
            .properties
            .periods
            .iter()
            .take(usize::from(days) * 2)
            .map(Self::normalize_period)
            .collect::<Result<Vec<_>, _>>()?;

        if periods.is_empty() {
            return Err(WeatherError::ParseError(
                "NWS forecast contained no periods".to_string(),
            ));
        }

        Ok(NormalizedDailyForecast::new(
            PROVIDER_NAME,
            PROVIDER_ID,
            location,
            periods,
        ))
    }

    #[instrument(skip(self), fields(provider = PROVIDER_ID, location = %location))]
    async fn get_alerts(&self, location: &GeoLocation) -> Result<Vec<WeatherAlert>, WeatherError> {
        validate_location(location)?;

        let url = format!("{}/alerts/active", self.config.base_url);
        let point = CoordinateKey::from(location).to_string();
        let request = self
            .client
            .get(&url)
            .query(&[("point", point)])
            .header(header::ACCEPT, GEO_JSON);
        let response: AlertsResponse =
            read_json(send(request, self.config.timeout_secs).await?).await?;

        let now = Utc::now();
        let alerts: Vec<WeatherAlert> = response
            .features
            .into_iter()
            .map(|feature| {
                let props = feature.properties;
                WeatherAlert {
                    headline: props.headline.unwrap_or_else(|| props.event.clone()),
                    description: props.description.unwrap_or_default(),
                    severity: Self::map_severity(&props.severity),
                    expires: props.expires.as_deref().and_then(|s| parse_datetime(s).ok()),
                    event: props.event,
                }
            })
            .filter(|alert| alert.is_active_at(now))
            .collect();

        debug!(count = alerts.len(), "Fetched NWS alerts");
        Ok(alerts)
    }
}

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointsProperties {
    grid_id: String,
    grid_x: u32,
    grid_y: u32,
    forecast: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastPeriod {
    start_time: String,
    #[serde(default)]
    is_daytime: bool,
    temperature: f64,
    #[serde(default)]
    temperature_unit: String,
    #[serde(default)]
    probability_of_precipitation: Option<QuantitativeValue>,
    #[serde(default)]
    wind_speed: String,
    #[serde(default)]
    wind_direction: String,
    #[serde(default)]
    short_forecast: String,
    #[serde(default)]
    detailed_forecast: String,
}

#[derive(Debug, Deserialize)]
struct QuantitativeValue {
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    properties: AlertProperties,
}

#[derive(Debug, Deserialize)]
struct AlertProperties {
    event: String,
    headline: Option<String>,
    description: Option<String>,
    #[serde(default)]
    severity: String,
    expires: Option<String>,
}
