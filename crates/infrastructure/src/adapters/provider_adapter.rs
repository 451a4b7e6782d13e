//! Provider adapter - Implements WeatherProviderPort over any ForecastClient
//!
//! Collapses every provider-specific `WeatherError` into
//! `ApplicationError::ProviderUnavailable` so nothing client-specific
//! reaches the router.
//!
//! When a circuit breaker is attached, only transient errors (transport,
//! 5xx, timeouts, rate limits) count towards opening it.

use application::error::ApplicationError;
use application::ports::WeatherProviderPort;
use async_trait::async_trait;
use domain::{GeoLocation, NormalizedDailyForecast, WeatherAlert};
use integration_weather::{ForecastClient, WeatherError};
use tracing::{debug, instrument, warn};

use super::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};

/// Adapts a [`ForecastClient`] to the application's provider port
pub struct ProviderAdapter<C> {
    client: C,
    native: bool,
    circuit_breaker: Option<CircuitBreaker>,
}

impl<C: ForecastClient> std::fmt::Debug for ProviderAdapter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderAdapter")
            .field("provider", &self.client.provider_id())
            .field("native", &self.native)
            .field(
                "circuit_breaker",
                &self.circuit_breaker.as_ref().map(CircuitBreaker::state),
            )
            .finish()
    }
}

impl<C: ForecastClient> ProviderAdapter<C> {
    /// Wrap a national weather service client (eligible for fallback)
    #[must_use]
    pub const fn native(client: C) -> Self {
        Self {
            client,
            native: true,
            circuit_breaker: None,
        }
    }

    /// Wrap an Open-Meteo client (no further fallback layer)
    #[must_use]
    pub const fn open_meteo(client: C) -> Self {
        Self {
            client,
            native: false,
            circuit_breaker: None,
        }
    }

    /// Guard forecast calls with a circuit breaker
    #[must_use]
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = Some(CircuitBreaker::with_config(
            self.client.provider_id(),
            config,
        ));
        self
    }

    /// The wrapped client
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    fn map_error(&self, err: &WeatherError) -> ApplicationError {
        warn!(
            provider = self.client.provider_id(),
            error = %err,
            transient = err.is_transient(),
            "Provider call failed"
        );
        ApplicationError::provider_unavailable(self.client.provider_id(), err.to_string())
    }
}

#[async_trait]
impl<C: ForecastClient> WeatherProviderPort for ProviderAdapter<C> {
    fn provider_id(&self) -> &'static str {
        self.client.provider_id()
    }

    fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    fn supports_alerts(&self) -> bool {
        self.client.supports_alerts()
    }

    fn is_native(&self) -> bool {
        self.native
    }

    #[instrument(skip(self, location), fields(provider = self.client.provider_id(), location = %location))]
    async fn get_forecast(
        &self,
        location: &GeoLocation,
        days: u8,
    ) -> Result<NormalizedDailyForecast, ApplicationError> {
        let result = match &self.circuit_breaker {
            Some(cb) => cb
                .call_with(
                    || self.client.get_forecast(location, days),
                    WeatherError::is_transient,
                )
                .await
                .map_err(|e| match e {
                    CircuitBreakerError::CircuitOpen(name) => ApplicationError::provider_unavailable(
                        name,
                        "circuit breaker open".to_string(),
                    ),
                    CircuitBreakerError::ServiceError(err) => self.map_error(&err),
                }),
            None => self
                .client
                .get_forecast(location, days)
                .await
                .map_err(|err| self.map_error(&err)),
        };

        if let Ok(forecast) = &result {
            debug!(periods = forecast.len(), "Retrieved forecast");
        }
        result
    }

    #[instrument(skip(self, location), fields(provider = self.client.provider_id(), location = %location))]
    async fn get_alerts(
        &self,
        location: &GeoLocation,
    ) -> Result<Vec<WeatherAlert>, ApplicationError> {
        if !self.client.supports_alerts() {
            return Ok(Vec::new());
        }
        self.client
            .get_alerts(location)
            .await
            .map_err(|err| self.map_error(&err))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use domain::NormalizedForecast;

    use super::*;

    #[derive(Default)]
    struct StubClient {
        calls: AtomicUsize,
        error: Option<fn() -> WeatherError>,
    }

    fn unavailable() -> WeatherError {
        WeatherError::ServiceUnavailable("HTTP 503".to_string())
    }

    fn out_of_coverage() -> WeatherError {
        WeatherError::OutOfCoverage {
            provider: "Stub Service",
            latitude: 25.76,
            longitude: -80.19,
        }
    }

    #[async_trait]
    impl ForecastClient for StubClient {
        fn provider_id(&self) -> &'static str {
            "stub"
        }

        fn provider_name(&self) -> &'static str {
            "Stub Service"
        }

        fn supports_alerts(&self) -> bool {
            false
        }

        fn max_forecast_days(&self) -> u8 {
            7
        }

        async fn get_forecast(
            &self,
            location: &GeoLocation,
            _days: u8,
        ) -> Result<NormalizedDailyForecast, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = self.error {
                return Err(error());
            }
            Ok(NormalizedDailyForecast::new(
                "Stub Service",
                "stub",
                location,
                vec![NormalizedForecast::new(Utc::now(), 1.0)],
            ))
        }

        async fn get_alerts(&self, _: &GeoLocation) -> Result<Vec<WeatherAlert>, WeatherError> {
            Err(WeatherError::RequestFailed("should not be called".to_string()))
        }
    }

    fn location() -> GeoLocation {
        GeoLocation::new(45.0, -75.0).unwrap()
    }

    #[tokio::test]
    async fn forwards_metadata_and_success() {
        let adapter = ProviderAdapter::native(StubClient::default());
        assert_eq!(adapter.provider_id(), "stub");
        assert_eq!(adapter.provider_name(), "Stub Service");
        assert!(adapter.is_native());
        assert!(!ProviderAdapter::open_meteo(StubClient::default()).is_native());

        let forecast = adapter.get_forecast(&location(), 3).await.unwrap();
        assert_eq!(forecast.provider_id, "stub");
    }

    #[tokio::test]
    async fn errors_become_provider_unavailable() {
        let adapter = ProviderAdapter::native(StubClient {
            error: Some(unavailable),
            ..Default::default()
        });
        let err = adapter.get_forecast(&location(), 3).await.unwrap_err();
        match err {
            ApplicationError::ProviderUnavailable { provider, reason } => {
                assert_eq!(provider, "stub");
                assert!(reason.contains("503"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn alerts_skip_clients_without_support() {
        let adapter = ProviderAdapter::native(StubClient::default());
        assert!(adapter.get_alerts(&location()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_circuit_fails_fast() {
        let adapter = ProviderAdapter::native(StubClient {
            error: Some(unavailable),
            ..Default::default()
        })
        .with_circuit_breaker(CircuitBreakerConfig {
            failure_threshold: 2,
            success_threshold: 1,
            half_open_timeout_secs: 3600,
        });

        for _ in 0..2 {
            adapter.get_forecast(&location(), 1).await.unwrap_err();
        }
        let err = adapter.get_forecast(&location(), 1).await.unwrap_err();
        assert!(err.to_string().contains("circuit breaker open"));
        assert_eq!(adapter.client().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn out_of_coverage_does_not_open_circuit() {
        let adapter = ProviderAdapter::native(StubClient {
            error: Some(out_of_coverage),
            ..Default::default()
        })
        .with_circuit_breaker(CircuitBreakerConfig {
            failure_threshold: 2,
            success_threshold: 1,
            half_open_timeout_secs: 3600,
        });

        for _ in 0..5 {
            let err = adapter.get_forecast(&location(), 1).await.unwrap_err();
            assert!(!err.to_string().contains("circuit breaker open"));
        }
        assert_eq!(adapter.client().calls.load(Ordering::SeqCst), 5);
    }
}
