//! # Last.fm Integration Module
//!
//! Read-only access to a user's scrobbles through the Last.fm 2.0 JSON API.
//!
//! ```text
//! CLI (tables, spinners)
//!          ↓
//! history / top / tags      ← endpoint-specific paging and shaping
//!          ↓
//! ScrobbleTransport         ← one GET, returns the decoded JSON body
//!          ↓
//! LastFmClient (reqwest)
//! ```
//!
//! Endpoint modules never talk to reqwest directly. They go through the
//! [`ScrobbleTransport`] trait, which the real [`LastFmClient`] implements
//! and tests replace with the `mockall`-generated `MockScrobbleTransport`.
//!
//! Requests are issued one at a time. There is no retry, backoff or caching:
//! a failed request ends the operation with a [`FetchError`].

pub mod history;
pub mod payload;
pub mod tags;
pub mod top;

use reqwest::{Client, StatusCode, header::USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{config::LastFmConfig, error::FetchError, lastfm::payload::ApiErrorBody};

/// Issues a single Last.fm API call.
///
/// `params` carries the method-specific query parameters (`method`, `user`,
/// `page`, ...). Implementations add credentials and the response format.
///
/// # Mocking Support
///
/// Unit tests, and dependents enabling the `mock` feature, get a
/// `MockScrobbleTransport` generated by `mockall`.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[allow(async_fn_in_trait)]
pub trait ScrobbleTransport {
    async fn get(&self, params: &[(&'static str, String)]) -> Result<Value, FetchError>;
}

/// Calls `transport` and decodes the body into `T`.
pub async fn call<T, R>(transport: &T, params: &[(&'static str, String)]) -> Result<R, FetchError>
where
    T: ScrobbleTransport,
    R: DeserializeOwned,
{
    let value = transport.get(params).await?;
    Ok(serde_json::from_value(value)?)
}

/// HTTP transport against the real Last.fm API.
pub struct LastFmClient {
    config: LastFmConfig,
    http: Client,
}

impl LastFmClient {
    pub fn new(config: LastFmConfig) -> Self {
        log::debug!("Initialized Last.fm client for {}", config.api_url);
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn user(&self) -> &str {
        &self.config.user
    }
}

impl ScrobbleTransport for LastFmClient {
    async fn get(&self, params: &[(&'static str, String)]) -> Result<Value, FetchError> {
        let mut query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        query.push(("api_key", self.config.api_key.as_str()));
        query.push(("format", "json"));

        log::debug!(
            "GET {} {}",
            self.config.api_url,
            params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&")
        );

        let response = self
            .http
            .get(&self.config.api_url)
            .header(USER_AGENT, &self.config.user_agent)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_body(status, &body)
    }
}

/// Turns a raw Last.fm response into JSON, mapping both HTTP failures and
/// the in-band `{"error": n, "message": ...}` envelope to [`FetchError`].
pub fn parse_body(status: StatusCode, body: &str) -> Result<Value, FetchError> {
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            body: body.to_string(),
        });
    }

    let value: Value = serde_json::from_str(body)?;
    if value.get("error").is_some() {
        let err: ApiErrorBody = serde_json::from_value(value)?;
        return Err(FetchError::Api {
            code: err.error,
            message: err.message,
        });
    }

    Ok(value)
}

/// Value of `key` among request parameters.
pub fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str())
}
