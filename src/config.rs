//! Configuration management for streamdash.
//!
//! Values come from environment variables, which are first seeded from a
//! `.env` file in the local data directory. Everything the pipeline needs is
//! collected into plain config values once, in `main`, and handed to the
//! clients that use them:
//!
//! - [`Settings`] - time zone and week boundary used for display and for the
//!   weekly listening window
//! - [`LastFmConfig`] - API key, user and endpoint for Last.fm
//! - [`SpotifyConfig`] - OAuth and Web API settings for Spotify
//!
//! Each value has a `from_lookup` constructor taking a variable lookup
//! function, so the parsing rules can be exercised without touching the
//! process environment.

use std::{env, path::PathBuf};

use chrono::Weekday;
use chrono_tz::Tz;

use crate::error::ConfigError;

pub const DEFAULT_TIMEZONE: &str = "US/Central";
pub const DEFAULT_LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";
pub const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_SPOTIFY_SCOPE: &str =
    "user-read-currently-playing user-top-read user-read-recently-played user-read-email";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file is looked up at:
/// - Linux: `~/.local/share/streamdash/.env`
/// - macOS: `~/Library/Application Support/streamdash/.env`
/// - Windows: `%LOCALAPPDATA%/streamdash/.env`
///
/// The directory is created when missing. A missing file is not an error,
/// since all values may also come from the process environment.
pub async fn load_env() -> Result<(), ConfigError> {
    let path = env_file_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| ConfigError::EnvFile(e.to_string()))?;
    }

    if !path.is_file() {
        log::debug!("No environment file at {}", path.display());
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| ConfigError::EnvFile(e.to_string()))?;
    log::debug!("Loaded environment from {}", path.display());
    Ok(())
}

fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("streamdash/.env");
    path
}

fn process_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var).ok_or(ConfigError::Missing(var))
}

fn or_default<F>(lookup: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var).unwrap_or_else(|| default.to_string())
}

/// Display and windowing settings shared by all commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub timezone: Tz,
    pub week_start: Weekday,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::US::Central,
            week_start: Weekday::Mon,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    /// `STREAMDASH_TIMEZONE` takes an IANA zone name, `STREAMDASH_WEEK_START`
    /// a weekday name (`mon`, `Monday`, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tz_name = or_default(&lookup, "STREAMDASH_TIMEZONE", DEFAULT_TIMEZONE);
        let timezone = tz_name
            .parse::<Tz>()
            .map_err(|_| ConfigError::Invalid {
                var: "STREAMDASH_TIMEZONE",
                value: tz_name.clone(),
            })?;

        let week_start = match lookup("STREAMDASH_WEEK_START") {
            Some(day) => day.parse::<Weekday>().map_err(|_| ConfigError::Invalid {
                var: "STREAMDASH_WEEK_START",
                value: day.clone(),
            })?,
            None => Weekday::Mon,
        };

        Ok(Self {
            timezone,
            week_start,
        })
    }
}

/// Credentials and endpoint for the Last.fm API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastFmConfig {
    pub api_key: String,
    pub user: String,
    pub user_agent: String,
    pub api_url: String,
}

impl LastFmConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

        Ok(Self {
            api_key: required(&lookup, "LASTFM_API_KEY")?,
            user: required(&lookup, "LASTFM_USER")?,
            user_agent: or_default(&lookup, "LASTFM_USER_AGENT", &default_agent),
            api_url: or_default(&lookup, "LASTFM_API_URL", DEFAULT_LASTFM_API_URL),
        })
    }
}

/// OAuth and Web API settings for Spotify.
///
/// There is no client secret: the authorization code flow uses PKCE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub server_address: String,
}

impl SpotifyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            client_id: required(&lookup, "SPOTIFY_API_AUTH_CLIENT_ID")?,
            redirect_uri: required(&lookup, "SPOTIFY_API_REDIRECT_URI")?,
            scope: or_default(&lookup, "SPOTIFY_API_AUTH_SCOPE", DEFAULT_SPOTIFY_SCOPE),
            auth_url: or_default(&lookup, "SPOTIFY_API_AUTH_URL", DEFAULT_SPOTIFY_AUTH_URL),
            token_url: or_default(&lookup, "SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_TOKEN_URL),
            api_url: or_default(&lookup, "SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL),
            server_address: or_default(&lookup, "SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn settings_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn settings_rejects_unknown_zone() {
        let err = Settings::from_lookup(lookup_from(&[("STREAMDASH_TIMEZONE", "Mars/Olympus")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "STREAMDASH_TIMEZONE",
                value: "Mars/Olympus".to_string()
            }
        );
    }

    #[test]
    fn settings_parses_week_start() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("STREAMDASH_TIMEZONE", "Europe/Berlin"),
            ("STREAMDASH_WEEK_START", "sunday"),
        ]))
        .unwrap();
        assert_eq!(settings.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(settings.week_start, Weekday::Sun);
    }

    #[test]
    fn lastfm_requires_key_and_user() {
        let err = LastFmConfig::from_lookup(lookup_from(&[("LASTFM_USER", "someone")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("LASTFM_API_KEY"));

        let config = LastFmConfig::from_lookup(lookup_from(&[
            ("LASTFM_USER", "someone"),
            ("LASTFM_API_KEY", "abc"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, DEFAULT_LASTFM_API_URL);
        assert!(config.user_agent.starts_with("streamdash/"));
    }

    #[test]
    fn spotify_defaults_endpoints() {
        let config = SpotifyConfig::from_lookup(lookup_from(&[
            ("SPOTIFY_API_AUTH_CLIENT_ID", "client"),
            ("SPOTIFY_API_REDIRECT_URI", "http://127.0.0.1:8888/callback"),
        ]))
        .unwrap();
        assert_eq!(config.token_url, DEFAULT_SPOTIFY_TOKEN_URL);
        assert_eq!(config.server_address, DEFAULT_SERVER_ADDRESS);
        assert!(config.scope.contains("user-top-read"));
    }
}
