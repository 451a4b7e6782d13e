//! Common client abstraction over all weather sources

use async_trait::async_trait;
use domain::{GeoLocation, NormalizedDailyForecast, WeatherAlert};

use crate::error::WeatherError;

/// A single upstream weather source
///
/// Implementations validate the location and clamp `days` to
/// [`max_forecast_days`](Self::max_forecast_days) before any HTTP call, and
/// always return metric data.
#[async_trait]
pub trait ForecastClient: Send + Sync {
    /// Stable identifier used for cache keys, e.g. `"nws"`
    fn provider_id(&self) -> &'static str;

    /// Human-readable source name, e.g. `"National Weather Service"`
    fn provider_name(&self) -> &'static str;

    /// Whether [`get_alerts`](Self::get_alerts) can return anything
    fn supports_alerts(&self) -> bool;

    /// Longest forecast range the source serves
    fn max_forecast_days(&self) -> u8;

    /// Fetch and normalize a forecast
    async fn get_forecast(
        &self,
        location: &GeoLocation,
        days: u8,
    ) -> Result<NormalizedDailyForecast, WeatherError>;

    /// Fetch active alerts; sources without alert support return an empty list
    async fn get_alerts(&self, location: &GeoLocation) -> Result<Vec<WeatherAlert>, WeatherError>;
}

/// Clamp a requested day count to `1..=max`
#[must_use]
pub fn clamp_days(days: u8, max: u8) -> u8 {
    days.clamp(1, max.max(1))
}
