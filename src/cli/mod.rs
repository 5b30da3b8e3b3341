//! # CLI Module
//!
//! User-facing commands of streamdash. Each command loads what it needs from
//! the configuration, calls into the Last.fm or Spotify layer and renders the
//! result as tables.
//!
//! ```text
//! CLI Layer (tables, spinners, status lines)
//!     ↓
//! Aggregation (ranking, shares, tag counts)
//!     ↓
//! API Layer (Last.fm / Spotify clients)
//! ```
//!
//! ## Commands
//!
//! - [`week`] - this week's plays, ranked, with artist shares and tags
//! - [`recent`] - latest completed plays of the week
//! - [`top_tracks`] / [`top_artists`] - Last.fm's own rankings for a period
//! - [`spotify_auth`] - OAuth 2.0 PKCE sign-in with Spotify
//! - [`spotify_top_artists`], [`spotify_top_tracks`], [`spotify_recent`] -
//!   Spotify's view of the same listening
//!
//! Commands return errors to the binary instead of exiting; `main` reports
//! them with [`crate::error!`].
//!
//! ## Usage
//!
//! ```bash
//! streamdash week                       # this week's ranking
//! streamdash week --no-tags --timeout 60
//! streamdash top artists --period 1month
//! streamdash spotify auth               # once, opens the browser
//! streamdash spotify top-tracks --time-range short
//! ```

mod recent;
mod spotify;
mod top;
mod week;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use recent::recent;
pub use spotify::{spotify_auth, spotify_recent, spotify_top_artists, spotify_top_tracks};
pub use top::{top_artists, top_tracks};
pub use week::{WeekOptions, week};

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
