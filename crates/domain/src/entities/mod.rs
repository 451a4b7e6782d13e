//! Entities - the normalized forecast model shared by every provider

mod alert;
mod forecast;

pub use alert::{AlertSeverity, WeatherAlert};
pub use forecast::{NormalizedDailyForecast, NormalizedForecast};
