//! Weather provider port
//!
//! One implementation per upstream source. The router only ever sees
//! `ApplicationError` from these calls.

use async_trait::async_trait;
use domain::{GeoLocation, NormalizedDailyForecast, WeatherAlert};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for a single forecast source
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherProviderPort: Send + Sync {
    /// Stable identifier used in cache keys, e.g. `"nws"`
    fn provider_id(&self) -> &'static str;

    /// Display name, e.g. `"National Weather Service"`
    fn provider_name(&self) -> &'static str;

    /// Whether this source publishes alerts at all
    fn supports_alerts(&self) -> bool;

    /// True for national services (NWS, Environment Canada, Met Office)
    ///
    /// Only native providers are eligible for fallback to Open-Meteo.
    fn is_native(&self) -> bool;

    /// Fetch a normalized forecast
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::ProviderUnavailable` for any upstream failure.
    async fn get_forecast(
        &self,
        location: &GeoLocation,
        days: u8,
    ) -> Result<NormalizedDailyForecast, ApplicationError>;

    /// Fetch active alerts
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::ProviderUnavailable` for any upstream failure.
    async fn get_alerts(&self, location: &GeoLocation)
    -> Result<Vec<WeatherAlert>, ApplicationError>;
}
