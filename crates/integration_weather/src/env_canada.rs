//! Environment Canada client
//!
//! Reads city-page forecasts from the MSC GeoMet OGC API. The service covers
//! Canada only and is known to return intermittent 404s, so every failure
//! surfaces as a plain [`WeatherError`] for the caller to fall back on.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use domain::units::clamp_percentage;
use domain::{
    AlertSeverity, GeoLocation, NormalizedDailyForecast, NormalizedForecast, WeatherAlert,
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::EnvCanadaConfig;
use crate::error::WeatherError;
use crate::http::{build_http_client, read_json, send, validate_location};
use crate::models::parse_datetime;
use crate::provider::{ForecastClient, clamp_days};
use crate::text::{cloud_cover_from_text, parse_metric_amount, parse_precipitation_chance};

const PROVIDER_ID: &str = "env_canada";
const PROVIDER_NAME: &str = "Environment Canada";
const MAX_DAYS: u8 = 7;

/// Canada bounding box: (min lat, max lat, min lon, max lon)
pub const CANADA_BOUNDS: (f64, f64, f64, f64) = (41.0, 84.0, -141.0, -52.0);

/// City-page forecasts are issued as consecutive half-day periods
const PERIOD_HOURS: i64 = 12;

/// Environment Canada HTTP client
#[derive(Debug)]
pub struct EnvCanadaClient {
    client: Client,
    config: EnvCanadaConfig,
}

impl EnvCanadaClient {
    /// Create a new Environment Canada client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: EnvCanadaConfig) -> Result<Self, WeatherError> {
        let client = build_http_client(&config.user_agent, config.timeout_secs)?;
        Ok(Self { client, config })
    }

    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_defaults() -> Result<Self, WeatherError> {
        Self::new(EnvCanadaConfig::default())
    }

    /// Whether the location lies inside the Canadian bounding box
    #[must_use]
    pub fn covers(location: &GeoLocation) -> bool {
        let (min_lat, max_lat, min_lon, max_lon) = CANADA_BOUNDS;
        location.is_within(min_lat, max_lat, min_lon, max_lon)
    }

    fn ensure_covered(location: &GeoLocation) -> Result<(), WeatherError> {
        validate_location(location)?;
        if Self::covers(location) {
            Ok(())
        } else {
            Err(WeatherError::OutOfCoverage {
                provider: PROVIDER_NAME,
                latitude: location.latitude(),
                longitude: location.longitude(),
            })
        }
    }

    /// Fetch the city-page site closest to `location`
    async fn nearest_site(&self, location: &GeoLocation) -> Result<SiteProperties, WeatherError> {
        let r = self.config.search_radius_deg;
        let bbox = format!(
            "{:.4},{:.4},{:.4},{:.4}",
            location.longitude() - r,
            location.latitude() - r,
            location.longitude() + r,
            location.latitude() + r
        );
        let url = format!(
            "{}/collections/citypageweather-realtime/items",
            self.config.base_url
        );
        debug!(url = %url, bbox = %bbox, "Searching Environment Canada city pages");

        let request = self.client.get(&url).query(&[
            ("f", "json"),
            ("lang", "en"),
            ("bbox", bbox.as_str()),
        ]);
        let response = send(request, self.config.timeout_secs).await?;
        if response.status() == StatusCode::NOT_FOUND {
            warn!("Environment Canada city-page collection returned 404");
            return Err(WeatherError::ServiceUnavailable(
                "City-page collection not found (HTTP 404)".to_string(),
            ));
        }

        let collection: FeatureCollection = read_json(response).await?;
        Self::pick_nearest(collection.features, location).ok_or(WeatherError::OutOfCoverage {
            provider: PROVIDER_NAME,
            latitude: location.latitude(),
            longitude: location.longitude(),
        })
    }

    fn pick_nearest(features: Vec<SiteFeature>, location: &GeoLocation) -> Option<SiteProperties> {
        features
            .into_iter()
            .filter_map(|feature| {
                let [lon, lat] = feature.geometry.coordinates;
                let site = GeoLocation::new(lat, lon).ok()?;
                Some((location.distance_km(&site), feature.properties))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(distance, site)| {
                debug!(site = %site.name, distance_km = distance, "Selected nearest city page");
                site
            })
    }

    fn normalize_period(period: &SitePeriod, timestamp: DateTime<Utc>) -> Option<NormalizedForecast> {
        let reading = period.temperatures.first()?;
        let mut forecast = NormalizedForecast::new(timestamp, reading.value);
        match reading.class.as_str() {
            "high" => forecast.temperature_max = Some(reading.value),
            "low" => forecast.temperature_min = Some(reading.value),
            _ => {}
        }

        let summary = period
            .abbreviated_forecast
            .as_ref()
            .map_or(period.text_summary.as_str(), |a| a.text_summary.as_str());

        forecast.precipitation_probability = period
            .abbreviated_forecast
            .as_ref()
            .and_then(|a| a.pop)
            .map_or_else(
                || parse_precipitation_chance(&period.text_summary),
                clamp_percentage,
            );
        forecast.precipitation_mm =
            parse_metric_amount(&period.text_summary, "amount", "mm").unwrap_or(0.0);
        forecast.snowfall_cm =
            parse_metric_amount(&period.text_summary, "amount", "cm").unwrap_or(0.0);
        forecast.cloud_cover = cloud_cover_from_text(summary);

        if let Some(wind) = &period.winds {
            forecast.wind_speed_kmh = wind.speed;
            forecast.wind_gust_kmh = wind.gust.unwrap_or(wind.speed).max(wind.speed);
            if !wind.direction.trim().is_empty() {
                forecast.wind_direction = wind.direction.trim().to_uppercase();
            }
        }

        forecast.description = summary.to_string();
        Some(forecast)
    }

    /// Map a Canadian warning category onto the shared scale
    #[must_use]
    pub fn map_severity(kind: &str) -> AlertSeverity {
        match kind.to_ascii_lowercase().as_str() {
            "warning" => AlertSeverity::Severe,
            "watch" | "advisory" => AlertSeverity::Moderate,
            _ => AlertSeverity::Minor,
        }
    }
}

#[async_trait]
impl ForecastClient for EnvCanadaClient {
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
        Self::ensure_covered(location)?;
        let days = clamp_days(days, MAX_DAYS);

        let site = self.nearest_site(location).await?;
        let group = site.forecast_group.ok_or_else(|| {
            WeatherError::ServiceUnavailable(format!("No forecast published for {}", site.name))
        })?;
        let issued = group
            .issued_at
            .as_deref()
            .map_or_else(|| Ok(Utc::now()), parse_datetime)?;

        let periods: Vec<NormalizedForecast> = group
            .forecasts
            .iter()
            .take(usize::from(days) * 2)
            .zip(0_i64..)
            .filter_map(|(period, index)| {
                let timestamp = issued + Duration::hours(PERIOD_HOURS * index);
                let normalized = Self::normalize_period(period, timestamp);
                if normalized.is_none() {
                    debug!(period = %period.period, "Skipping period without temperature");
                }
                normalized
            })
            .collect();

        if periods.is_empty() {
            return Err(WeatherError::ParseError(format!(
                "No usable forecast periods for {}",
                site.name
            )));
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
        Self::ensure_covered(location)?;
        let site = self.nearest_site(location).await?;

        let now = Utc::now();
        Ok(site
            .warnings
            .into_iter()
            .map(|warning| WeatherAlert {
                severity: Self::map_severity(&warning.kind),
                expires: warning
                    .expiry_time
                    .as_deref()
                    .and_then(|s| parse_datetime(s).ok()),
                headline: warning.description.clone(),
                event: warning.description,
                description: warning.details.unwrap_or_default(),
            })
            .filter(|alert| alert.is_active_at(now))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<SiteFeature>,
}

#[derive(Debug, Deserialize)]
struct SiteFeature {
    geometry: PointGeometry,
    properties: SiteProperties,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    /// GeoJSON order: longitude, latitude
    coordinates: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteProperties {
    name: String,
    forecast_group: Option<ForecastGroup>,
    #[serde(default)]
    warnings: Vec<SiteWarning>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastGroup {
    issued_at: Option<String>,
    #[serde(default)]
    forecasts: Vec<SitePeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SitePeriod {
    #[serde(default)]
    period: String,
    #[serde(default)]
    text_summary: String,
    abbreviated_forecast: Option<AbbreviatedForecast>,
    #[serde(default)]
    temperatures: Vec<TemperatureReading>,
    winds: Option<WindReading>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AbbreviatedForecast {
    #[serde(default)]
    text_summary: String,
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TemperatureReading {
    class: String,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct WindReading {
    speed: f64,
    gust: Option<f64>,
    #[serde(default)]
    direction: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteWarning {
    #[serde(rename = "type")]
    kind: String,
    description: String,
    details: Option<String>,
    expiry_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bounding_box() {
        assert!(EnvCanadaClient::covers(&GeoLocation::new_unchecked(43.65, -79.38)));
        assert!(EnvCanadaClient::covers(&GeoLocation::new_unchecked(49.28, -123.12)));
        assert!(!EnvCanadaClient::covers(&GeoLocation::new_unchecked(25.0, -80.0)));
        assert!(!EnvCanadaClient::covers(&GeoLocation::new_unchecked(51.5, -0.12)));
    }

    #[test]
    fn test_out_of_bounds_is_out_of_coverage() {
        let err = EnvCanadaClient::ensure_covered(&GeoLocation::new_unchecked(25.0, -80.0))
            .unwrap_err();
        assert!(matches!(
            err,
            WeatherError::OutOfCoverage {
                provider: "Environment Canada",
                ..
            }
        ));
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(EnvCanadaClient::map_severity("warning"), AlertSeverity::Severe);
        assert_eq!(EnvCanadaClient::map_severity("watch"), AlertSeverity::Moderate);
        assert_eq!(EnvCanadaClient::map_severity("advisory"), AlertSeverity::Moderate);
        assert_eq!(EnvCanadaClient::map_severity("statement"), AlertSeverity::Minor);
    }

    #[test]
    fn test_pick_nearest_site() {
        let features: Vec<SiteFeature> = serde_json::from_value(serde_json::json!([
            {"geometry": {"coordinates": [-79.40, 43.74]}, "properties": {"name": "Toronto"}},
            {"geometry": {"coordinates": [-79.87, 43.26]}, "properties": {"name": "Hamilton"}}
        ]))
        .unwrap();

        let near_hamilton = GeoLocation::new_unchecked(43.25, -79.85);
        let site = EnvCanadaClient::pick_nearest(features, &near_hamilton).unwrap();
        assert_eq!(site.name, "Hamilton");
        assert!(EnvCanadaClient::pick_nearest(Vec::new(), &near_hamilton).is_none());
    }

    #[test]
    fn test_normalize_period_estimates_from_text() {
        let period: SitePeriod = serde_json::from_value(serde_json::json!({
            "period": "Tonight",
            "textSummary": "Periods of snow. Snowfall amount 2 to 4 cm. Low minus 8.",
            "temperatures": [{"class": "low", "value": -8}],
            "winds": {"speed": 20, "gust": 40, "direction": "nw"}
        }))
        .unwrap();
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 22, 0, 0).unwrap();

        let f = EnvCanadaClient::normalize_period(&period, ts).unwrap();
        assert!((f.temperature + 8.0).abs() < f64::EPSILON);
        assert_eq!(f.temperature_min, Some(-8.0));
        assert_eq!(f.precipitation_probability, 80);
        assert!((f.snowfall_cm - 4.0).abs() < f64::EPSILON);
        assert!(f.precipitation_mm.abs() < f64::EPSILON);
        assert_eq!(f.cloud_cover, 85);
        assert!((f.wind_gust_kmh - 40.0).abs() < f64::EPSILON);
        assert_eq!(f.wind_direction, "NW");
    }

    #[test]
    fn test_structured_pop_wins() {
        let period: SitePeriod = serde_json::from_value(serde_json::json!({
            "textSummary": "Cloudy. 60 percent chance of showers. High 12.",
            "abbreviatedForecast": {"textSummary": "Chance of showers", "pop": 60},
            "temperatures": [{"class": "high", "value": 12}]
        }))
        .unwrap();
        let f = EnvCanadaClient::normalize_period(&period, Utc::now()).unwrap();
        assert_eq!(f.precipitation_probability, 60);
        assert_eq!(f.temperature_max, Some(12.0));
        assert_eq!(f.description, "Chance of showers");
    }

    #[test]
    fn test_period_without_temperature_is_skipped() {
        let period: SitePeriod =
            serde_json::from_value(serde_json::json!({"textSummary": "Sunny"})).unwrap();
        assert!(EnvCanadaClient::normalize_period(&period, Utc::now()).is_none());
    }
}
