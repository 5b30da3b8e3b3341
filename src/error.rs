//! Error types shared by the Last.fm pipeline, the Spotify client and the
//! configuration loader.

use reqwest::StatusCode;
use thiserror::Error;

/// A request against an upstream API could not be completed.
///
/// Fetch errors are terminal for the page sequence that produced them: the
/// paginated fetchers abort and return the error instead of a partial result.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS or body transfer failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Last.fm answered 200 but with an error envelope.
    #[error("Last.fm API error {code}: {message}")]
    Api { code: i64, message: String },

    /// The response body was not the JSON shape we expected.
    #[error("Cannot decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    Unexpected(String),

    /// The caller's wall-clock budget ran out before all pages arrived.
    #[error("Fetch timed out after {0} seconds")]
    Timeout(u64),
}

/// A raw record is missing data that every [`PlayEvent`](crate::types::PlayEvent)
/// must carry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedRecordError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field {field} is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("Cannot load environment file: {0}")]
    EnvFile(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid server address {0:?}")]
    Address(String),

    #[error("Cannot bind callback server to {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Authentication failed or timed out")]
    TimedOut,

    #[error("Cannot access token cache: {0}")]
    Cache(String),

    #[error("No stored Spotify token. Please run streamdash spotify auth")]
    NotAuthenticated,
}
