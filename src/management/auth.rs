use std::path::PathBuf;

use chrono::Utc;

use crate::{config::SpotifyConfig, error::AuthError, spotify::auth, types::Token};

/// Seconds before the real expiry at which a token already counts as expired.
const EXPIRY_MARGIN: u64 = 240;

/// Spotify token persisted under the local data directory.
pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    pub async fn load() -> Result<Self, AuthError> {
        let path = Self::token_path();
        let content = match async_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::NotAuthenticated);
            }
            Err(e) => return Err(AuthError::Cache(e.to_string())),
        };
        let token: Token =
            serde_json::from_str(&content).map_err(|e| AuthError::Cache(e.to_string()))?;
        Ok(Self { token })
    }

    pub async fn persist(&self) -> Result<(), AuthError> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| AuthError::Cache(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(&self.token)
            .map_err(|e| AuthError::Cache(e.to_string()))?;
        async_fs::write(&path, json)
            .await
            .map_err(|e| AuthError::Cache(e.to_string()))
    }

    /// Access token that is valid for at least a few more minutes,
    /// refreshing and persisting it first when needed.
    pub async fn get_valid_token(&mut self, config: &SpotifyConfig) -> Result<String, AuthError> {
        if self.is_expired(Utc::now().timestamp() as u64) {
            log::debug!("Spotify token expired, refreshing");
            self.token = auth::refresh_token(config, &self.token.refresh_token).await?;
            self.persist().await?;
        }

        Ok(self.token.access_token.clone())
    }

    fn is_expired(&self, now: u64) -> bool {
        let expires_at = self.token.obtained_at + self.token.expires_in;
        now + EXPIRY_MARGIN >= expires_at
    }

    fn token_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("streamdash/cache/token.json");
        path
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(obtained_at: u64, expires_in: u64) -> Token {
        Token {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            scope: String::new(),
            expires_in,
            obtained_at,
        }
    }

    #[test]
    fn expires_four_minutes_early() {
        let manager = TokenManager::new(token(1_000, 3_600));
        assert!(!manager.is_expired(1_000));
        assert!(!manager.is_expired(4_359));
        assert!(manager.is_expired(4_360));
        assert!(manager.is_expired(10_000));
    }

    #[test]
    fn short_lived_token_is_expired_immediately() {
        let manager = TokenManager::new(token(1_000, 100));
        assert!(manager.is_expired(1_000));
    }
}
