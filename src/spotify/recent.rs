use chrono_tz::Tz;

use crate::{
    error::FetchError,
    spotify::SpotifyClient,
    types::{Paging, PlayHistory, SpotifyPlayRow},
    utils::{SPOTIFY_TIME_FORMAT, join_names, reformat_rfc3339},
};

/// Most plays `GET /me/player/recently-played` returns per request.
pub const RECENT_LIMIT: u32 = 50;

impl SpotifyClient {
    /// Recently played tracks, newest first.
    pub async fn recently_played(&self, limit: u32) -> Result<Vec<PlayHistory>, FetchError> {
        let limit = limit.clamp(1, RECENT_LIMIT);
        let page: Paging<PlayHistory> = self
            .get_json(
                "/me/player/recently-played",
                &[("limit", limit.to_string())],
            )
            .await?;
        Ok(page.items)
    }
}

pub fn play_rows(items: &[PlayHistory], tz: Tz) -> Vec<SpotifyPlayRow> {
    items
        .iter()
        .map(|p| SpotifyPlayRow {
            played_at: reformat_rfc3339(&p.played_at, tz, SPOTIFY_TIME_FORMAT),
            name: p.track.name.clone(),
            artists: join_names(p.track.artists.iter().map(|a| a.name.as_str())),
        })
        .collect()
}
