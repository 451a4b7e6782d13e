//! Country-based forecast routing with a single Open-Meteo fallback
//!
//! Each request makes at most two sequential provider calls: the primary
//! for the country, then (only if the primary is a native service) the
//! fallback. Results are cached for one hour under the identity of the
//! provider that produced them.

use std::collections::BTreeMap;
use std::sync::Arc;

use domain::{CountryCode, GeoLocation, NormalizedDailyForecast, WeatherAlert};
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{CacheKey, ForecastCachePort, WeatherProviderPort};

/// One row of the routing table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// Country code, or `None` for the default route
    pub country: Option<CountryCode>,
    /// Provider identifier
    pub provider_id: &'static str,
    /// Provider display name
    pub provider_name: &'static str,
    /// Whether failures on this route fall back to Open-Meteo
    pub native: bool,
}

/// Routes forecast and alert requests to the provider for each country
pub struct WeatherRouter {
    routes: BTreeMap<CountryCode, Arc<dyn WeatherProviderPort>>,
    default_provider: Arc<dyn WeatherProviderPort>,
    fallback: Arc<dyn WeatherProviderPort>,
    cache: Arc<dyn ForecastCachePort>,
}

impl std::fmt::Debug for WeatherRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherRouter")
            .field(
                "routes",
                &self
                    .routes
                    .iter()
                    .map(|(code, p)| (code.as_str(), p.provider_id()))
                    .collect::<Vec<_>>(),
            )
            .field("default_provider", &self.default_provider.provider_id())
            .field("fallback", &self.fallback.provider_id())
            .finish_non_exhaustive()
    }
}

impl WeatherRouter {
    /// Create a router with no country routes
    ///
    /// Unmapped countries use `fallback` as their primary until
    /// [`with_default_provider`](Self::with_default_provider) says otherwise.
    #[must_use]
    pub fn new(cache: Arc<dyn ForecastCachePort>, fallback: Arc<dyn WeatherProviderPort>) -> Self {
        Self {
            routes: BTreeMap::new(),
            default_provider: Arc::clone(&fallback),
            fallback,
            cache,
        }
    }

    /// Set the primary provider for unmapped countries
    #[must_use]
    pub fn with_default_provider(mut self, provider: Arc<dyn WeatherProviderPort>) -> Self {
        self.default_provider = provider;
        self
    }

    /// Route a country to a provider, replacing any existing route
    #[must_use]
    pub fn with_route(mut self, country: CountryCode, provider: Arc<dyn WeatherProviderPort>) -> Self {
        self.routes.insert(country, provider);
        self
    }

    /// Primary provider for a country
    #[must_use]
    pub fn primary_for(&self, country: &CountryCode) -> &Arc<dyn WeatherProviderPort> {
        self.routes.get(country).unwrap_or(&self.default_provider)
    }

    /// Routing table sorted by country, followed by the default route
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.routes
            .iter()
            .map(|(code, provider)| Self::describe(Some(code.clone()), provider.as_ref()))
            .chain(std::iter::once(Self::describe(
                None,
                self.default_provider.as_ref(),
            )))
            .collect()
    }

    /// The fallback provider's route description
    #[must_use]
    pub fn fallback_route(&self) -> RouteInfo {
        Self::describe(None, self.fallback.as_ref())
    }

    /// Shared forecast cache
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn ForecastCachePort> {
        &self.cache
    }

    fn describe(country: Option<CountryCode>, provider: &dyn WeatherProviderPort) -> RouteInfo {
        RouteInfo {
            country,
            provider_id: provider.provider_id(),
            provider_name: provider.provider_name(),
            native: provider.is_native(),
        }
    }

    /// Get a forecast without alerts
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::AllProvidersFailed` when no provider could
    /// produce a forecast.
    pub async fn get_forecast(
        &self,
        country: &CountryCode,
        location: &GeoLocation,
        days: u8,
    ) -> Result<NormalizedDailyForecast, ApplicationError> {
        self.forecast(country, location, days, false).await
    }

    /// Get a forecast with active alerts attached
    ///
    /// Alerts are fetched independently of the forecast and never cause the
    /// request to fail.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::AllProvidersFailed` when no provider could
    /// produce a forecast.
    pub async fn get_forecast_with_alerts(
        &self,
        country: &CountryCode,
        location: &GeoLocation,
        days: u8,
    ) -> Result<NormalizedDailyForecast, ApplicationError> {
        self.forecast(country, location, days, true).await
    }

    #[instrument(skip(self, country, location), fields(country = %country, location = %location))]
    async fn forecast(
        &self,
        country: &CountryCode,
        location: &GeoLocation,
        days: u8,
        include_alerts: bool,
    ) -> Result<NormalizedDailyForecast, ApplicationError> {
        let primary = self.primary_for(country);
        let key = CacheKey::new(primary.provider_id(), location, days, include_alerts);
        if let Some(cached) = self.cache.get(&key).await {
            debug!(key = %key, "Forecast cache hit");
            return Ok(cached);
        }

        let error = match primary.get_forecast(location, days).await {
            Ok(mut forecast) => {
                forecast.is_fallback = false;
                if include_alerts {
                    forecast.alerts = self.alerts(country, location).await;
                }
                self.cache.set(key, forecast.clone()).await;
                return Ok(forecast);
            },
            Err(e @ ApplicationError::ProviderUnavailable { .. }) => e,
            Err(e) => return Err(e),
        };

        if !primary.is_native() {
            warn!(provider = primary.provider_id(), error = %error, "Primary provider failed, no fallback layer");
            return Err(ApplicationError::AllProvidersFailed {
                attempted: vec![primary.provider_id().to_string()],
                reason: error.to_string(),
            });
        }

        warn!(
            provider = primary.provider_id(),
            fallback = self.fallback.provider_id(),
            error = %error,
            "Native provider failed, falling back"
        );
        self.fallback_forecast(country, location, days, include_alerts, primary.provider_id())
            .await
    }

    async fn fallback_forecast(
        &self,
        country: &CountryCode,
        location: &GeoLocation,
        days: u8,
        include_alerts: bool,
        primary_id: &str,
    ) -> Result<NormalizedDailyForecast, ApplicationError> {
        let key =
            CacheKey::new(self.fallback.provider_id(), location, days, include_alerts).as_fallback();
        if let Some(cached) = self.cache.get(&key).await {
            debug!(key = %key, "Fallback forecast cache hit");
            return Ok(cached);
        }

        match self.fallback.get_forecast(location, days).await {
            Ok(forecast) => {
                let mut forecast = forecast.as_fallback();
                if include_alerts {
                    forecast.alerts = self.alerts(country, location).await;
                }
                info!(provider = %forecast.provider, "Served forecast from fallback provider");
                self.cache.set(key, forecast.clone()).await;
                Ok(forecast)
            },
            Err(e) => {
                warn!(provider = self.fallback.provider_id(), error = %e, "Fallback provider failed");
                Err(ApplicationError::AllProvidersFailed {
                    attempted: vec![
                        primary_id.to_string(),
                        self.fallback.provider_id().to_string(),
                    ],
                    reason: e.to_string(),
                })
            },
        }
    }

    /// Get active alerts for a location
    ///
    /// Tries the primary provider, then the fallback for native routes.
    /// Failures are logged and yield an empty list.
    #[instrument(skip(self, country, location), fields(country = %country, location = %location))]
    pub async fn get_alerts(&self, country: &CountryCode, location: &GeoLocation) -> Vec<WeatherAlert> {
        self.alerts(country, location).await
    }

    async fn alerts(&self, country: &CountryCode, location: &GeoLocation) -> Vec<WeatherAlert> {
        let primary = self.primary_for(country);
        let mut candidates = vec![primary];
        if primary.is_native() && primary.provider_id() != self.fallback.provider_id() {
            candidates.push(&self.fallback);
        }

        for provider in candidates {
            if !provider.supports_alerts() {
                debug!(provider = provider.provider_id(), "Provider has no alerts feed");
                continue;
            }
            match provider.get_alerts(location).await {
                Ok(alerts) => return alerts,
                Err(e) => {
                    warn!(provider = provider.provider_id(), error = %e, "Alert lookup failed");
                },
            }
        }

        Vec::new()
    }
}
