//! # Spotify Integration Module
//!
//! Read access to the signed-in user's Spotify profile: top artists, top
//! tracks and recently played tracks.
//!
//! ```text
//! CLI (tables)
//!          ↓
//! top / recent        ← endpoint calls and row shaping
//!          ↓
//! SpotifyClient       ← bearer-authenticated GET + JSON decoding
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Authentication
//!
//! [`auth`] implements the OAuth 2.0 authorization code flow with PKCE:
//! 1. a random code verifier and its SHA256 challenge are generated
//! 2. a local callback server is started
//! 3. the authorization URL is opened in the browser
//! 4. the callback exchanges code + verifier for a token
//! 5. the token is persisted by [`crate::management::TokenManager`] and
//!    refreshed shortly before it expires
//!
//! No client secret is stored or sent.
//!
//! ## Errors
//!
//! Web API calls return [`FetchError`]; the auth flow returns
//! [`crate::error::AuthError`]. Nothing is retried.

pub mod auth;
pub mod recent;
pub mod top;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{config::SpotifyConfig, error::FetchError, types::CurrentUser};

/// Authenticated Web API client for one access token.
pub struct SpotifyClient {
    api_url: String,
    access_token: String,
    http: Client,
}

impl SpotifyClient {
    pub fn new(config: &SpotifyConfig, access_token: String) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            access_token,
            http: Client::new(),
        }
    }

    pub(crate) async fn get_json<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.api_url, path);
        log::debug!("GET {url}");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Profile of the signed-in user (`GET /me`).
    pub async fn current_user(&self) -> Result<CurrentUser, FetchError> {
        self.get_json("/me", &[]).await
    }
}
