//! Adapters implementing application ports

mod circuit_breaker;
mod provider_adapter;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
pub use provider_adapter::ProviderAdapter;
