//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Latitude or longitude outside the WGS84 range
    #[error(
        "Invalid coordinates ({latitude}, {longitude}): latitude must be -90 to 90, longitude must be -180 to 180"
    )]
    InvalidCoordinates {
        /// Rejected latitude
        latitude: f64,
        /// Rejected longitude
        longitude: f64,
    },

    /// Not an ISO 3166-1 alpha-2 code
    #[error("Invalid country code: {0:?}")]
    InvalidCountryCode(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_coordinates_message_names_both_values() {
        let err = DomainError::InvalidCoordinates {
            latitude: 91.0,
            longitude: 10.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("91"));
        assert!(msg.contains("latitude"));
        assert!(msg.contains("longitude"));
    }

    #[test]
    fn invalid_country_code_message() {
        let err = DomainError::InvalidCountryCode("USA".to_string());
        assert_eq!(err.to_string(), "Invalid country code: \"USA\"");
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("days must be positive".to_string());
        assert_eq!(err.to_string(), "Validation failed: days must be positive");
    }
}
