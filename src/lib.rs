//! Personal listening dashboard.
//!
//! Pulls a user's listening history from Last.fm, turns it into ranked
//! tables for the current week and renders them in the terminal. A Spotify
//! integration shows the same user's top artists, top tracks and recent
//! plays as Spotify sees them.
//!
//! # Modules
//!
//! - `lastfm` - paginated history fetcher and top-chart/tag endpoints
//! - `normalize` - raw Last.fm records to [`types::PlayEvent`]
//! - `aggregate` - dense rankings, artist shares and tag counts
//! - `spotify` - OAuth PKCE flow and Web API client
//! - `api` / `server` - local callback server for the OAuth redirect
//! - `management` - persisted Spotify token
//! - `cli` - command implementations and table output
//! - `config` - environment-driven configuration
//! - `error` - error types
//! - `types` - data structures and table rows
//! - `utils` - time and PKCE helpers
//!
//! # Example
//!
//! ```ignore
//! use streamdash::{aggregate::rank_plays, lastfm::{LastFmClient, history}};
//!
//! let client = LastFmClient::new(LastFmConfig::from_env()?);
//! let events = history::fetch_plays_since(&client, client.user(), from, 200, |_, _| {}).await?;
//! let ranked = rank_plays(&events);
//! ```

pub mod aggregate;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod lastfm;
pub mod management;
pub mod normalize;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for command-level glue.
///
/// Library functions return their own error types; commands collect them
/// into a boxed error that `main` reports.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```ignore
/// info!("Found {} plays", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the
/// program with status 1.
///
/// Only for the binary's top level; library code returns errors instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// For recoverable issues the user should notice, such as an empty week.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
