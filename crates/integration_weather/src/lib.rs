//! Weather provider integrations
//!
//! HTTP clients for the national and global forecast services:
//!
//! - [`NwsClient`]: National Weather Service (USA)
//! - [`EnvCanadaClient`]: Environment Canada
//! - [`MetOfficeClient`]: Met Office Weather DataHub (UK, API key required)
//! - [`OpenMeteoClient`]: Open-Meteo, parameterized by [`OpenMeteoModel`]
//!
//! Every client implements [`ForecastClient`] and returns metric
//! [`domain::NormalizedDailyForecast`] values.

pub mod config;
pub mod env_canada;
pub mod error;
mod http;
pub mod met_office;
mod models;
pub mod nws;
pub mod open_meteo;
pub mod provider;
pub mod text;

pub use config::{
    DEFAULT_USER_AGENT, EnvCanadaConfig, MET_OFFICE_API_KEY_ENV, MetOfficeConfig, NwsConfig,
    OpenMeteoConfig,
};
pub use env_canada::EnvCanadaClient;
pub use error::WeatherError;
pub use met_office::MetOfficeClient;
pub use models::WeatherCondition;
pub use nws::{GridInfo, NwsClient};
pub use open_meteo::{OpenMeteoClient, OpenMeteoModel, model_for_country};
pub use provider::ForecastClient;
