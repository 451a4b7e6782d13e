//! Forecast facade
//!
//! Entry point for downstream callers: takes raw country codes and
//! coordinates, validates them, and delegates to the [`WeatherRouter`].

use std::sync::Arc;

use domain::{CountryCode, GeoLocation, NormalizedDailyForecast, WeatherAlert};
use tracing::instrument;

use super::weather_router::{RouteInfo, WeatherRouter};
use crate::error::ApplicationError;
use crate::ports::{CacheKey, CacheStats};

/// Facade over the router for callers that work with raw inputs
#[derive(Debug, Clone)]
pub struct WeatherService {
    router: Arc<WeatherRouter>,
}

impl WeatherService {
    /// Create a new weather service
    #[must_use]
    pub const fn new(router: Arc<WeatherRouter>) -> Self {
        Self { router }
    }

    /// Underlying router
    #[must_use]
    pub const fn router(&self) -> &Arc<WeatherRouter> {
        &self.router
    }

    fn parse(
        country: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<(CountryCode, GeoLocation), ApplicationError> {
        Ok((
            CountryCode::parse(country)?,
            GeoLocation::new(latitude, longitude)?,
        ))
    }

    /// Get a forecast for a country and coordinate
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Domain` for an invalid country code or
    /// coordinate, or `ApplicationError::AllProvidersFailed` when no provider
    /// could serve the request.
    #[instrument(skip(self))]
    pub async fn get_forecast(
        &self,
        country: &str,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<NormalizedDailyForecast, ApplicationError> {
        let (country, location) = Self::parse(country, latitude, longitude)?;
        self.router.get_forecast(&country, &location, days).await
    }

    /// Get a forecast with active alerts attached
    ///
    /// # Errors
    ///
    /// Same as [`get_forecast`](Self::get_forecast).
    #[instrument(skip(self))]
    pub async fn get_forecast_with_alerts(
        &self,
        country: &str,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<NormalizedDailyForecast, ApplicationError> {
        let (country, location) = Self::parse(country, latitude, longitude)?;
        self.router
            .get_forecast_with_alerts(&country, &location, days)
            .await
    }

    /// Get active alerts; provider failures yield an empty list
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Domain` for invalid input only.
    #[instrument(skip(self))]
    pub async fn get_alerts(
        &self,
        country: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<WeatherAlert>, ApplicationError> {
        let (country, location) = Self::parse(country, latitude, longitude)?;
        Ok(self.router.get_alerts(&country, &location).await)
    }

    /// Display label for a result: "<Provider>" or "<Provider> (fallback)"
    #[must_use]
    pub fn get_data_source(forecast: &NormalizedDailyForecast) -> String {
        forecast.data_source()
    }

    /// Which provider a country is routed to
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Domain` for an invalid country code.
    pub fn provider_for(&self, country: &str) -> Result<RouteInfo, ApplicationError> {
        let country = CountryCode::parse(country)?;
        let provider = self.router.primary_for(&country);
        Ok(RouteInfo {
            country: Some(country),
            provider_id: provider.provider_id(),
            provider_name: provider.provider_name(),
            native: provider.is_native(),
        })
    }

    /// Full routing table, default route last
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.router.routes()
    }

    /// Forecast cache counters
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        let mut stats = self.router.cache().stats();
        stats.entries = self.router.cache().len() as u64;
        stats
    }

    /// Drop cached forecasts for a request, both primary and fallback
    ///
    /// Returns how many entries were removed.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Domain` for invalid input.
    pub async fn invalidate(
        &self,
        country: &str,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<usize, ApplicationError> {
        let (country, location) = Self::parse(country, latitude, longitude)?;
        let primary = self.router.primary_for(&country).provider_id();
        let fallback = self.router.fallback_route().provider_id;
        let cache = self.router.cache();

        let mut removed = 0;
        for include_alerts in [false, true] {
            let key = CacheKey::new(primary, &location, days, include_alerts);
            removed += usize::from(cache.invalidate(&key).await);
            let key = CacheKey::new(fallback, &location, days, include_alerts).as_fallback();
            removed += usize::from(cache.invalidate(&key).await);
        }
        Ok(removed)
    }

    /// Drop every cached forecast
    pub async fn clear_cache(&self) {
        self.router.cache().clear().await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::Utc;
    use domain::{DomainError, NormalizedForecast};
    use parking_lot::Mutex;

    use super::*;
    use crate::ports::{ForecastCachePort, MockWeatherProviderPort};

    #[derive(Debug, Default)]
    struct TestCache {
        entries: Mutex<HashMap<CacheKey, NormalizedDailyForecast>>,
    }

    #[async_trait]
    impl ForecastCachePort for TestCache {
        async fn get(&self, key: &CacheKey) -> Option<NormalizedDailyForecast> {
            self.entries.lock().get(key).cloned()
        }

        async fn set(&self, key: CacheKey, forecast: NormalizedDailyForecast) {
            self.entries.lock().insert(key, forecast);
        }

        async fn invalidate(&self, key: &CacheKey) -> bool {
            self.entries.lock().remove(key).is_some()
        }

        async fn clear(&self) {
            self.entries.lock().clear();
        }

        async fn cleanup_expired(&self) -> usize {
            0
        }

        fn len(&self) -> usize {
            self.entries.lock().len()
        }

        fn stats(&self) -> CacheStats {
            CacheStats::default()
        }
    }

    fn mock_provider(id: &'static str, name: &'static str, native: bool) -> MockWeatherProviderPort {
        let mut mock = MockWeatherProviderPort::new();
        mock.expect_provider_id().return_const(id);
        mock.expect_provider_name().return_const(name);
        mock.expect_is_native().return_const(native);
        mock.expect_supports_alerts().return_const(native);
        mock.expect_get_forecast().returning(move |loc, _| {
            Ok(NormalizedDailyForecast::new(
                name,
                id,
                loc,
                vec![NormalizedForecast::new(Utc::now(), 12.0)],
            ))
        });
        mock
    }

    fn service() -> WeatherService {
        let router = WeatherRouter::new(
            Arc::new(TestCache::default()),
            Arc::new(mock_provider("open_meteo", "Open-Meteo", false)),
        )
        .with_route(
            CountryCode::parse("GB").unwrap(),
            Arc::new(mock_provider("met_office", "Met Office", true)),
        );
        WeatherService::new(Arc::new(router))
    }

    #[tokio::test]
    async fn forecast_accepts_raw_inputs() {
        let forecast = service().get_forecast("uk", 51.5, -0.12, 3).await.unwrap();
        assert_eq!(forecast.provider, "Met Office");
        assert_eq!(WeatherService::get_data_source(&forecast), "Met Office");
    }

    #[tokio::test]
    async fn invalid_country_is_a_domain_error() {
        let err = service().get_forecast("GBR", 51.5, -0.12, 3).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidCountryCode(_))
        ));
    }

    #[tokio::test]
    async fn invalid_coordinates_are_a_domain_error() {
        let err = service().get_alerts("US", 95.0, 0.0).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn provider_for_reports_route() {
        let svc = service();
        let route = svc.provider_for("gb").unwrap();
        assert_eq!(route.provider_name, "Met Office");
        assert!(route.native);
        assert_eq!(svc.provider_for("ZA").unwrap().provider_id, "open_meteo");
    }

    #[tokio::test]
    async fn invalidate_and_clear() {
        let svc = service();
        svc.get_forecast("GB", 51.5, -0.12, 2).await.unwrap();
        svc.get_forecast("ZA", -33.9, 18.4, 2).await.unwrap();
        assert_eq!(svc.cache_stats().entries, 2);

        assert_eq!(svc.invalidate("GB", 51.5, -0.12, 2).await.unwrap(), 1);
        assert_eq!(svc.invalidate("GB", 51.5, -0.12, 2).await.unwrap(), 0);

        svc.clear_cache().await;
        assert_eq!(svc.cache_stats().entries, 0);
    }
}
