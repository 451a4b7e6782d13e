//! Application services - Use case implementations

mod weather_router;
mod weather_service;

pub use weather_router::{RouteInfo, WeatherRouter};
pub use weather_service::WeatherService;
