//! Error types for Yelp Fusion operations.
//!
//! This module provides the error type shared by every Fusion API operation,
//! covering pre-flight validation, transport failures, unexpected HTTP
//! statuses, and JSON decoding failures.

use thiserror::Error;

/// Main error type for Yelp Fusion operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Search parameters name neither a location nor a latitude/longitude pair
    #[error("missing required fields: location or (latitude and longitude)")]
    MissingLocation,

    /// Both open_now and open_at were set on the same search
    #[error("cannot set both open_at and open_now parameters")]
    ConflictingOpenFilters,

    /// Phone search was invoked with a blank phone number
    #[error("phone number is required")]
    PhoneRequired,

    /// Client construction or base URL configuration failed
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed in transit
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The request deadline elapsed before a response arrived
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The server answered with a status the operation does not accept
    #[error("unexpected status: {0}")]
    UnexpectedStatus(String),

    /// The response body could not be decoded into the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// A request URL could not be assembled
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for Yelp Fusion operations.
pub type Result<T> = std::result::Result<T, Error>;

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
