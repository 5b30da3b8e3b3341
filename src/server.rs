use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;

use crate::{api, config::SpotifyConfig, error::AuthError, spotify::auth::SharedPkce};

/// Binds the callback listener. Done before the browser opens so the
/// redirect can never arrive before the server listens.
pub async fn bind(address: &str) -> Result<TcpListener, AuthError> {
    let addr =
        SocketAddr::from_str(address).map_err(|_| AuthError::Address(address.to_string()))?;

    TcpListener::bind(&addr)
        .await
        .map_err(|source| AuthError::Bind {
            addr: address.to_string(),
            source,
        })
}

pub fn router(config: Arc<SpotifyConfig>, state: SharedPkce) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(state))
        .layer(Extension(config))
}

pub async fn serve(listener: TcpListener, config: Arc<SpotifyConfig>, state: SharedPkce) {
    if let Err(e) = axum::serve(listener, router(config, state)).await {
        log::error!("Callback server stopped: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::Mutex;

    use super::*;

    fn config() -> Arc<SpotifyConfig> {
        Arc::new(SpotifyConfig {
            client_id: "client".to_string(),
            redirect_uri: "http://127.0.0.1/callback".to_string(),
            scope: String::new(),
            auth_url: String::new(),
            token_url: String::new(),
            api_url: String::new(),
            server_address: "127.0.0.1:0".to_string(),
        })
    }

    #[tokio::test]
    async fn routes_reach_their_handlers() {
        let listener = bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state: SharedPkce = Arc::new(Mutex::new(None));
        tokio::spawn(serve(listener, config(), state));

        let client = reqwest::Client::new();

        let health = client
            .get(format!("http://{addr}/health"))
            .send()
            .await
            .unwrap();
        assert!(health.status().is_success());
        let body: serde_json::Value = health.json().await.unwrap();
        assert_eq!(body["service"], "streamdash");

        // Both extensions must be present for the callback extractors to run
        let callback = client
            .get(format!("http://{addr}/callback"))
            .send()
            .await
            .unwrap();
        assert!(callback.status().is_success());
        assert!(
            callback
                .text()
                .await
                .unwrap()
                .contains("Missing authorization code")
        );
    }

    #[tokio::test]
    async fn bind_rejects_bad_address() {
        assert!(matches!(
            bind("not an address").await,
            Err(AuthError::Address(_))
        ));
    }
}
