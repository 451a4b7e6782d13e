//! Weather provider error types

use thiserror::Error;

/// Errors that can occur while talking to a weather provider
#[derive(Debug, Clone, Error)]
pub enum WeatherError {
    /// Connection to the weather service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the weather service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse response from weather service
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid coordinates provided
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// Location is valid but not served by this provider
    #[error("Location {latitude:.4}, {longitude:.4} is outside {provider} coverage")]
    OutOfCoverage {
        /// Provider that rejected the location
        provider: &'static str,
        /// Requested latitude
        latitude: f64,
        /// Requested longitude
        longitude: f64,
    },

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Credentials were rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Request timed out
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// Provider is misconfigured (raised at construction)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl WeatherError {
    /// Map a transport-level reqwest error
    pub(crate) fn from_transport(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }

    /// Returns true if the provider may succeed for the same request later
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::ServiceUnavailable(_)
                | Self::Timeout { .. }
                | Self::RateLimitExceeded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(WeatherError::ConnectionFailed("x".into()).is_transient());
        assert!(WeatherError::ServiceUnavailable("x".into()).is_transient());
        assert!(WeatherError::Timeout { timeout_secs: 30 }.is_transient());
        assert!(WeatherError::RateLimitExceeded.is_transient());

        assert!(!WeatherError::InvalidCoordinates.is_transient());
        assert!(!WeatherError::Configuration("x".into()).is_transient());
        assert!(!WeatherError::AuthenticationFailed("x".into()).is_transient());
    }

    #[test]
    fn test_out_of_coverage_display() {
        let err = WeatherError::OutOfCoverage {
            provider: "Environment Canada",
            latitude: 25.0,
            longitude: -80.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("25.0000"));
        assert!(msg.contains("Environment Canada"));
    }

    #[test]
    fn test_weather_error_display() {
        let err = WeatherError::InvalidCoordinates;
        assert!(err.to_string().contains("latitude"));
        assert!(err.to_string().contains("longitude"));

        let err = WeatherError::RateLimitExceeded;
        assert!(err.to_string().contains("Rate limit"));
    }
}
