//! Circuit breaker for upstream weather services
//!
//! # States
//!
//! - **Closed**: Normal operation, requests pass through
//! - **Open**: Provider is failing, requests fail fast without HTTP
//! - **Half-Open**: Testing whether the provider has recovered
//!
//! [`CircuitBreaker::call_with`] lets the caller decide which errors count
//! as failures. Errors that say nothing about provider health (a location
//! outside coverage, a missing API key) leave the state untouched.
//!
//! An open breaker on a native provider sends the router straight to the
//! Open-Meteo fallback instead of waiting on a timeout for every request.

use std::{
    fmt,
    future::Future,
    time::{Duration, Instant},
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Configuration for a circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Consecutive half-open successes before closing the circuit
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
    /// Seconds to stay open before trying again
    #[serde(default = "default_half_open_timeout")]
    pub half_open_timeout_secs: u64,
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_success_threshold() -> u32 {
    1
}

const fn default_half_open_timeout() -> u64 {
    60
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            success_threshold: default_success_threshold(),
            half_open_timeout_secs: default_half_open_timeout(),
        }
    }
}

impl CircuitBreakerConfig {
    /// Lower thresholds for quota-limited providers such as the Met Office
    #[must_use]
    pub const fn sensitive() -> Self {
        Self {
            failure_threshold: 3,
            success_threshold: 1,
            half_open_timeout_secs: 300,
        }
    }
}

/// State of a circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, requests pass through
    Closed,
    /// Provider is failing, requests fail fast
    Open,
    /// Testing whether the provider has recovered
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Error returned by [`CircuitBreaker::call`]
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// The circuit is open, the call was not attempted
    #[error("Circuit breaker open for '{0}'")]
    CircuitOpen(String),
    /// The wrapped call failed
    #[error(transparent)]
    ServiceError(E),
}

impl<E> CircuitBreakerError<E> {
    /// Returns true if this is a circuit open error
    #[must_use]
    pub const fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen(_))
    }
}

struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    opened_at: Option<Instant>,
}

/// Tracks consecutive failures of one provider
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: RwLock<BreakerState>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    /// Creates a breaker with default configuration
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Creates a breaker with custom configuration
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: RwLock::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                opened_at: None,
            }),
        }
    }

    /// Returns the name of this circuit breaker
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state, moving Open to Half-Open once the timeout has passed
    #[must_use]
    pub fn state(&self) -> CircuitState {
        let mut state = self.state.write();
        if state.state == CircuitState::Open
            && state.opened_at.is_some_and(|opened| {
                opened.elapsed() >= Duration::from_secs(self.config.half_open_timeout_secs)
            })
        {
            debug!(service = %self.name, "Circuit transitioning from Open to HalfOpen");
            state.state = CircuitState::HalfOpen;
            state.success_count = 0;
        }
        state.state
    }

    /// Returns true if calls are currently rejected
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    fn on_success(&self) {
        let mut state = self.state.write();
        state.failure_count = 0;
        if state.state == CircuitState::HalfOpen {
            state.success_count += 1;
            if state.success_count >= self.config.success_threshold {
                info!(service = %self.name, "Circuit transitioning from HalfOpen to Closed");
                state.state = CircuitState::Closed;
                state.success_count = 0;
                state.opened_at = None;
            }
        }
    }

    fn on_failure(&self) {
        let mut state = self.state.write();
        state.failure_count += 1;
        state.success_count = 0;

        let trip = match state.state {
            CircuitState::Closed => state.failure_count >= self.config.failure_threshold,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };
        if trip {
            warn!(
                service = %self.name,
                from = %state.state,
                failures = state.failure_count,
                "Circuit opening"
            );
            state.state = CircuitState::Open;
            state.opened_at = Some(Instant::now());
            state.failure_count = 0;
        }
    }

    /// Runs `f` unless the circuit is open, counting every error as a failure
    ///
    /// # Errors
    ///
    /// Returns `CircuitBreakerError::CircuitOpen` without calling `f` while
    /// open, or `CircuitBreakerError::ServiceError` with the inner error.
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.call_with(f, |_| true).await
    }

    /// Runs `f` unless the circuit is open
    ///
    /// Only errors for which `is_failure` returns true move the breaker
    /// towards open. Other errors are passed through without a state change.
    ///
    /// # Errors
    ///
    /// Same as [`CircuitBreaker::call`].
    pub async fn call_with<F, Fut, T, E, P>(
        &self,
        f: F,
        is_failure: P,
    ) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: FnOnce(&E) -> bool,
    {
        if self.is_open() {
            debug!(service = %self.name, "Circuit breaker rejecting call");
            return Err(CircuitBreakerError::CircuitOpen(self.name.clone()));
        }

        match f().await {
            Ok(value) => {
                self.on_success();
                Ok(value)
            },
            Err(e) => {
                if is_failure(&e) {
                    self.on_failure();
                } else {
                    debug!(service = %self.name, "Error not counted against circuit");
                }
                Err(CircuitBreakerError::ServiceError(e))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fail(cb: &CircuitBreaker) -> Result<(), CircuitBreakerError<&'static str>> {
        cb.call(|| async { Err::<(), _>("boom") }).await
    }

    async fn succeed(cb: &CircuitBreaker) -> Result<u8, CircuitBreakerError<&'static str>> {
        cb.call(|| async { Ok::<_, &'static str>(7) }).await
    }

    #[test]
    fn starts_closed() {
        let cb = CircuitBreaker::new("nws");
        assert_eq!(cb.name(), "nws");
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(format!("{cb:?}").contains("nws"));
    }

    #[test]
    fn state_display() {
        assert_eq!(CircuitState::Closed.to_string(), "closed");
        assert_eq!(CircuitState::Open.to_string(), "open");
        assert_eq!(CircuitState::HalfOpen.to_string(), "half-open");
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: CircuitBreakerConfig =
            serde_json::from_str(r#"{"failure_threshold": 2}"#).unwrap();
        assert_eq!(config.failure_threshold, 2);
        assert_eq!(config.success_threshold, 1);
        assert_eq!(config.half_open_timeout_secs, 60);
    }

    #[tokio::test]
    async fn opens_after_threshold_and_rejects() {
        let cb = CircuitBreaker::with_config("env_canada", CircuitBreakerConfig::sensitive());
        for _ in 0..3 {
            assert!(!fail(&cb).await.unwrap_err().is_circuit_open());
        }
        assert!(cb.is_open());

        let mut called = false;
        let result = cb
            .call(|| {
                called = true;
                async { Ok::<_, &'static str>(()) }
            })
            .await;
        assert!(result.unwrap_err().is_circuit_open());
        assert!(!called);
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let cb = CircuitBreaker::with_config("nws", CircuitBreakerConfig::sensitive());
        fail(&cb).await.unwrap_err();
        fail(&cb).await.unwrap_err();
        assert_eq!(succeed(&cb).await.unwrap(), 7);
        fail(&cb).await.unwrap_err();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn half_open_success_closes_circuit() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            success_threshold: 1,
            half_open_timeout_secs: 0,
        };
        let cb = CircuitBreaker::with_config("met_office", config);
        fail(&cb).await.unwrap_err();
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        succeed(&cb).await.unwrap();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn half_open_failure_reopens_circuit() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            success_threshold: 1,
            half_open_timeout_secs: 0,
        };
        let cb = CircuitBreaker::with_config("met_office", config);
        fail(&cb).await.unwrap_err();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        fail(&cb).await.unwrap_err();
        // Zero timeout moves straight back to half-open on the next read
        assert_eq!(cb.state(), CircuitState::HalfOpen);
    }

    #[tokio::test]
    async fn uncounted_errors_never_open_the_circuit() {
        let cb = CircuitBreaker::with_config("nws", CircuitBreakerConfig::sensitive());
        for _ in 0..10 {
            let err = cb
                .call_with(|| async { Err::<(), _>("out of coverage") }, |_| false)
                .await
                .unwrap_err();
            assert!(!err.is_circuit_open());
        }
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn uncounted_errors_do_not_reset_failures() {
        let cb = CircuitBreaker::with_config("nws", CircuitBreakerConfig::sensitive());
        let counted = |e: &&'static str| *e == "HTTP 503";
        for outcome in ["HTTP 503", "out of coverage", "HTTP 503", "HTTP 503"] {
            cb.call_with(|| async move { Err::<(), _>(outcome) }, counted)
                .await
                .unwrap_err();
        }
        assert!(cb.is_open());
    }
}
