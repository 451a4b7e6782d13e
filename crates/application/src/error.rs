//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
///
/// Provider-specific failures never cross this boundary: adapters collapse
/// them into [`ApplicationError::ProviderUnavailable`].
#[derive(Debug, Clone, Error)]
pub enum ApplicationError {
    /// Caller supplied an invalid coordinate or country code
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A single provider failed (transport, status, payload or coverage)
    #[error("Provider {provider} unavailable: {reason}")]
    ProviderUnavailable {
        /// Provider identifier
        provider: String,
        /// Human-readable cause
        reason: String,
    },

    /// Missing or invalid configuration, raised at construction
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Primary and fallback both failed; the caller decides whether to retry
    #[error("All providers failed (attempted: {}): {reason}", attempted.join(", "))]
    AllProvidersFailed {
        /// Provider identifiers in the order they were tried
        attempted: Vec<String>,
        /// Cause reported by the last provider
        reason: String,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Create a `ProviderUnavailable` error
    pub fn provider_unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Check if a manual retry could succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable { .. } | Self::AllProvidersFailed { .. }
        )
    }
}
