//! Application layer - Forecast routing and orchestration
//!
//! Defines the ports provider adapters and caches implement, the
//! country router with its Open-Meteo fallback, and the caller-facing
//! facade.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
