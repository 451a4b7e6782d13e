//! Service wiring
//!
//! Builds every provider once, assembles the country routing table and
//! hands back a ready [`WeatherService`].

use std::collections::HashMap;
use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::{ForecastCachePort, WeatherProviderPort};
use application::services::{WeatherRouter, WeatherService};
use domain::CountryCode;
use integration_weather::{
    EnvCanadaClient, ForecastClient, MetOfficeClient, NwsClient, OpenMeteoClient, OpenMeteoModel,
    WeatherError, model_for_country,
};
use tracing::info;

use crate::adapters::ProviderAdapter;
use crate::cache::{InMemoryForecastCache, spawn_cache_sweep_task};
use crate::config::WeatherAppConfig;

/// Countries served by Open-Meteo as their primary provider
pub const OPEN_METEO_COUNTRIES: [&str; 5] = ["FR", "IT", "CH", "NZ", "ZA"];

/// A wired service plus the handles needed at shutdown
#[derive(Debug)]
pub struct WeatherRuntime {
    /// Caller-facing facade
    pub service: WeatherService,
    /// Shared forecast cache
    pub cache: Arc<InMemoryForecastCache>,
    /// Background expiry sweep, when enabled
    pub sweep_task: Option<tokio::task::JoinHandle<()>>,
}

impl WeatherRuntime {
    /// Stop background work
    pub fn shutdown(self) {
        if let Some(handle) = self.sweep_task {
            handle.abort();
        }
    }
}

fn init_error(err: WeatherError) -> ApplicationError {
    match err {
        WeatherError::Configuration(msg) => ApplicationError::Configuration(msg),
        other => ApplicationError::Internal(format!("Failed to initialize provider: {other}")),
    }
}

fn country(code: &str) -> Result<CountryCode, ApplicationError> {
    Ok(CountryCode::parse(code)?)
}

fn native<C: ForecastClient + 'static>(
    client: C,
    config: &WeatherAppConfig,
) -> Arc<dyn WeatherProviderPort> {
    let adapter = ProviderAdapter::native(client);
    match config.circuit_breaker {
        Some(cb) => Arc::new(adapter.with_circuit_breaker(cb)),
        None => Arc::new(adapter),
    }
}

fn open_meteo(
    config: &WeatherAppConfig,
    model: OpenMeteoModel,
) -> Result<Arc<dyn WeatherProviderPort>, ApplicationError> {
    let client = OpenMeteoClient::new(config.open_meteo.with_model(model)).map_err(init_error)?;
    Ok(Arc::new(ProviderAdapter::open_meteo(client)))
}

/// Build the router with every provider and the country table
///
/// | Country | Provider |
/// |---------|----------|
/// | US | NWS |
/// | CA | Environment Canada |
/// | GB | Met Office |
/// | FR | Open-Meteo, Météo-France |
/// | IT, CH | Open-Meteo, DWD ICON-EU |
/// | NZ, ZA, others | Open-Meteo, best match |
///
/// # Errors
///
/// Returns `ApplicationError::Configuration` when the Met Office key is
/// missing from both the configuration and `METOFFICE_API_KEY`.
pub fn build_weather_router(
    config: &WeatherAppConfig,
    cache: Arc<dyn ForecastCachePort>,
) -> Result<WeatherRouter, ApplicationError> {
    let met_office =
        MetOfficeClient::new(config.met_office.clone().with_env_key()).map_err(init_error)?;
    let nws = NwsClient::new(config.nws.clone()).map_err(init_error)?;
    let env_canada = EnvCanadaClient::new(config.env_canada.clone()).map_err(init_error)?;

    let best_match = open_meteo(config, OpenMeteoModel::BestMatch)?;
    let fallback = open_meteo(config, OpenMeteoModel::BestMatch)?;

    let mut router = WeatherRouter::new(cache, fallback)
        .with_default_provider(Arc::clone(&best_match))
        .with_route(country("US")?, native(nws, config))
        .with_route(country("CA")?, native(env_canada, config))
        .with_route(country("GB")?, native(met_office, config));

    let mut by_model: HashMap<OpenMeteoModel, Arc<dyn WeatherProviderPort>> =
        HashMap::from([(OpenMeteoModel::BestMatch, best_match)]);
    for code in OPEN_METEO_COUNTRIES {
        let code = country(code)?;
        let model = model_for_country(&code);
        let provider = match by_model.get(&model) {
            Some(provider) => Arc::clone(provider),
            None => {
                let provider = open_meteo(config, model)?;
                by_model.insert(model, Arc::clone(&provider));
                provider
            },
        };
        router = router.with_route(code, provider);
    }

    info!(routes = ?router, "Weather router ready");
    Ok(router)
}

/// Build the cache, router and facade, and start the expiry sweep
///
/// Must be called from within a Tokio runtime when the sweep is enabled.
///
/// # Errors
///
/// Same as [`build_weather_router`].
pub fn build_weather_service(config: &WeatherAppConfig) -> Result<WeatherRuntime, ApplicationError> {
    let cache = Arc::new(InMemoryForecastCache::with_ttl(config.cache.ttl()));
    let router = build_weather_router(config, Arc::clone(&cache) as Arc<dyn ForecastCachePort>)?;

    let sweep_task = config
        .cache
        .sweep_interval()
        .map(|interval| spawn_cache_sweep_task(Arc::clone(&cache) as _, interval));

    Ok(WeatherRuntime {
        service: WeatherService::new(Arc::new(router)),
        cache,
        sweep_task,
    })
}
