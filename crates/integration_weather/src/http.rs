//! Shared HTTP plumbing for the provider clients

use std::time::Duration;

use domain::GeoLocation;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::WeatherError;

/// Build a reqwest client with the identifying user agent and timeout
pub(crate) fn build_http_client(user_agent: &str, timeout_secs: u64) -> Result<Client, WeatherError> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| WeatherError::ConnectionFailed(e.to_string()))
}

/// Reject locations that bypassed `GeoLocation::new`
pub(crate) fn validate_location(location: &GeoLocation) -> Result<(), WeatherError> {
    GeoLocation::new(location.latitude(), location.longitude())
        .map(|_| ())
        .map_err(|_| WeatherError::InvalidCoordinates)
}

/// Map a non-success status to the matching error
pub(crate) fn check_status(status: StatusCode) -> Result<(), WeatherError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(WeatherError::RateLimitExceeded);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(WeatherError::AuthenticationFailed(format!("HTTP {status}")));
    }
    if status.is_server_error() {
        return Err(WeatherError::ServiceUnavailable(format!("HTTP {status}")));
    }
    if !status.is_success() {
        return Err(WeatherError::RequestFailed(format!("HTTP {status}")));
    }
    Ok(())
}

/// Send a prepared request, mapping transport failures
pub(crate) async fn send(request: RequestBuilder, timeout_secs: u64) -> Result<Response, WeatherError> {
    request
        .send()
        .await
        .map_err(|e| WeatherError::from_transport(&e, timeout_secs))
}

/// Check the status and decode the JSON body
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, WeatherError> {
    let status = response.status();
    check_status(status)?;

    let body = response
        .text()
        .await
        .map_err(|e| WeatherError::RequestFailed(e.to_string()))?;
    debug!(status = %status, bytes = body.len(), "Received provider response");

    serde_json::from_str(&body).map_err(|e| WeatherError::ParseError(e.to_string()))
}
