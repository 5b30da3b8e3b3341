use std::{fmt, str::FromStr};

use crate::{
    error::FetchError,
    spotify::SpotifyClient,
    types::{Paging, SpotifyArtist, SpotifyArtistRow, SpotifyTrack, SpotifyTrackRow},
    utils::join_names,
};

/// Most items the top endpoints return per request.
pub const TOP_LIMIT: u32 = 50;

/// Window Spotify computes affinities over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    /// About four weeks.
    Short,
    /// About six months.
    #[default]
    Medium,
    /// Several years.
    Long,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [TimeRange::Short, TimeRange::Medium, TimeRange::Long];

    pub fn as_param(&self) -> &'static str {
        match self {
            TimeRange::Short => "short_term",
            TimeRange::Medium => "medium_term",
            TimeRange::Long => "long_term",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Short => "Short term",
            TimeRange::Medium => "Medium term",
            TimeRange::Long => "Long term",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TimeRange::ALL
            .into_iter()
            .find(|r| {
                wanted == r.as_param()
                    || wanted == r.label().to_lowercase()
                    || wanted == r.as_param().trim_end_matches("_term")
            })
            .ok_or_else(|| format!("Unknown time range {s:?}. Use short, medium or long"))
    }
}

impl SpotifyClient {
    /// `GET /me/top/artists`, best first.
    pub async fn top_artists(&self, range: TimeRange) -> Result<Vec<SpotifyArtist>, FetchError> {
        let page: Paging<SpotifyArtist> = self
            .get_json(
                "/me/top/artists",
                &[
                    ("time_range", range.as_param().to_string()),
                    ("limit", TOP_LIMIT.to_string()),
                ],
            )
            .await?;
        Ok(page.items)
    }

    /// `GET /me/top/tracks`, best first.
    pub async fn top_tracks(&self, range: TimeRange) -> Result<Vec<SpotifyTrack>, FetchError> {
        let page: Paging<SpotifyTrack> = self
            .get_json(
                "/me/top/tracks",
                &[
                    ("time_range", range.as_param().to_string()),
                    ("limit", TOP_LIMIT.to_string()),
                ],
            )
            .await?;
        Ok(page.items)
    }
}

/// Table rows for top artists. Prefers the medium sized (second) image.
pub fn artist_rows(artists: &[SpotifyArtist]) -> Vec<SpotifyArtistRow> {
    artists
        .iter()
        .enumerate()
        .map(|(i, a)| SpotifyArtistRow {
            rank: i + 1,
            name: a.name.clone(),
            genres: join_names(a.genres.iter().map(String::as_str)),
            popularity: a.popularity,
            followers: a.followers.as_ref().map(|f| f.total).unwrap_or(0),
            image_url: a
                .images
                .get(1)
                .or_else(|| a.images.first())
                .map(|img| img.url.clone())
                .unwrap_or_default(),
        })
        .collect()
}

pub fn track_rows(tracks: &[SpotifyTrack]) -> Vec<SpotifyTrackRow> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, t)| SpotifyTrackRow {
            rank: i + 1,
            name: t.name.clone(),
            artists: join_names(t.artists.iter().map(|a| a.name.as_str())),
            album: t.album.name.clone(),
            popularity: t.popularity,
        })
        .collect()
}
