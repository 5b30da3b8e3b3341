use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    config::SpotifyConfig,
    error::AuthError,
    server,
    types::{PkceToken, Token, TokenResponse},
    utils, warning,
};

/// State shared between the auth flow and the callback handler.
pub type SharedPkce = Arc<Mutex<Option<PkceToken>>>;

const MAX_WAIT: Duration = Duration::from_secs(60);

/// Runs the OAuth 2.0 PKCE flow and returns the obtained token.
///
/// 1. Generates a code verifier and its SHA256 challenge
/// 2. Binds the local callback server and serves it in the background
/// 3. Opens the authorization URL in the default browser
/// 4. Waits up to 60 seconds for the callback to store a token
///
/// The callback server is shut down before returning. Persisting the token
/// is left to the caller.
pub async fn auth(config: &SpotifyConfig, shared_state: SharedPkce) -> Result<Token, AuthError> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            token: None,
        });
    }

    let listener = server::bind(&config.server_address).await?;
    let server_config = Arc::new(config.clone());
    let server_state = Arc::clone(&shared_state);
    let server = tokio::spawn(async move {
        server::serve(listener, server_config, server_state).await;
    });

    let auth_url = authorize_url(config, &code_challenge);
    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(shared_state).await;
    server.abort();

    token.ok_or(AuthError::TimedOut)
}

/// Authorization URL carrying the PKCE challenge.
pub fn authorize_url(config: &SpotifyConfig, code_challenge: &str) -> String {
    let query = [
        ("client_id", config.client_id.as_str()),
        ("response_type", "code"),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("code_challenge", code_challenge),
        ("code_challenge_method", "S256"),
        ("scope", config.scope.as_str()),
    ];

    match reqwest::Url::parse_with_params(&config.auth_url, &query) {
        Ok(url) => url.to_string(),
        Err(e) => {
            log::warn!("Invalid auth URL {:?}: {}", config.auth_url, e);
            config.auth_url.clone()
        }
    }
}

/// Polls the shared state once per second until the callback handler has
/// stored a token, or the wait times out.
async fn wait_for_token(shared_state: SharedPkce) -> Option<Token> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < MAX_WAIT {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.clone()) {
            return Some(token);
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges an authorization code plus the PKCE verifier for a token.
pub async fn exchange_code_pkce(
    config: &SpotifyConfig,
    code: &str,
    verifier: &str,
) -> Result<Token, AuthError> {
    let res = Client::new()
        .post(&config.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", config.client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let body: TokenResponse = res.json().await?;
    Ok(token_from_response(body, None))
}

/// Trades a refresh token for a fresh access token.
pub async fn refresh_token(config: &SpotifyConfig, refresh_token: &str) -> Result<Token, AuthError> {
    let res = Client::new()
        .post(&config.token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", config.client_id.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let body: TokenResponse = res.json().await?;
    Ok(token_from_response(body, Some(refresh_token)))
}

/// Spotify may omit the refresh token on refresh; the previous one stays
/// valid in that case.
fn token_from_response(body: TokenResponse, previous_refresh: Option<&str>) -> Token {
    Token {
        access_token: body.access_token,
        refresh_token: body
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string))
            .unwrap_or_default(),
        scope: body.scope,
        expires_in: body.expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    }
}
