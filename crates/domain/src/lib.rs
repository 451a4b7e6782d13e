//! Domain layer for the forecast aggregator
//!
//! Contains the normalized forecast model, value objects, unit conversions
//! and domain errors. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod units;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
