use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One observed play of a track.
///
/// History records carry `played_at`, pre-aggregated top-track records carry
/// `server_play_count`. Never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayEvent {
    pub track_name: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub played_at: Option<DateTime<Utc>>,
    pub server_play_count: Option<u64>,
}

impl PlayEvent {
    pub fn played(
        track_name: impl Into<String>,
        artist_name: impl Into<String>,
        album_name: Option<String>,
        played_at: DateTime<Utc>,
    ) -> Self {
        Self {
            track_name: track_name.into(),
            artist_name: artist_name.into(),
            album_name,
            played_at: Some(played_at),
            server_play_count: None,
        }
    }

    pub fn counted(
        track_name: impl Into<String>,
        artist_name: impl Into<String>,
        album_name: Option<String>,
        server_play_count: u64,
    ) -> Self {
        Self {
            track_name: track_name.into(),
            artist_name: artist_name.into(),
            album_name,
            played_at: None,
            server_play_count: Some(server_play_count),
        }
    }
}

/// A row of an aggregated ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedTrack {
    pub rank: u32,
    pub track_name: String,
    pub artist_name: String,
    pub album_name: String,
    pub stream_count: u64,
}

/// How many distinct ranked tracks an artist contributes to a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistShare {
    pub artist_name: String,
    pub track_count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// A server-ranked Last.fm top artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopArtist {
    pub rank: u32,
    pub name: String,
    pub play_count: u64,
}

#[derive(Tabled)]
pub struct RankedTrackRow {
    #[tabled(rename = "Rank")]
    pub rank: u32,
    #[tabled(rename = "Track")]
    pub track: String,
    #[tabled(rename = "Artist")]
    pub artist: String,
    #[tabled(rename = "Album")]
    pub album: String,
    #[tabled(rename = "Streams")]
    pub streams: u64,
}

#[derive(Tabled)]
pub struct TopTrackRow {
    #[tabled(rename = "Rank")]
    pub rank: u32,
    #[tabled(rename = "Track")]
    pub track: String,
    #[tabled(rename = "Artist")]
    pub artist: String,
    #[tabled(rename = "Streams")]
    pub streams: u64,
}

#[derive(Tabled)]
pub struct TopArtistRow {
    #[tabled(rename = "Rank")]
    pub rank: u32,
    #[tabled(rename = "Artist")]
    pub artist: String,
    #[tabled(rename = "Streams")]
    pub streams: u64,
}

#[derive(Tabled)]
pub struct RecentTrackRow {
    #[tabled(rename = "Track")]
    pub track: String,
    #[tabled(rename = "Artist")]
    pub artist: String,
    #[tabled(rename = "Album")]
    pub album: String,
    #[tabled(rename = "Listened at")]
    pub listened_at: String,
}

#[derive(Tabled)]
pub struct ArtistShareRow {
    #[tabled(rename = "Artist")]
    pub artist: String,
    #[tabled(rename = "# of tracks")]
    pub tracks: u64,
    #[tabled(rename = "Pct.")]
    pub percent: String,
}

#[derive(Tabled)]
pub struct TagRow {
    #[tabled(rename = "Tag")]
    pub tag: String,
    #[tabled(rename = "Count")]
    pub count: u64,
}

/// Spotify access token as cached on disk. `obtained_at` is Unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// PKCE flow state shared with the callback handler.
#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// Body of the Spotify token endpoint. A refresh may omit `refresh_token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
}

/// `GET /me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Followers {
    pub total: u64,
}

/// Full artist object from the top-artists endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
    pub followers: Option<Followers>,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Artist credit on a track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Track object shared by top tracks and play history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub name: String,
    pub uri: String,
    pub artists: Vec<SimpleArtist>,
    pub album: SpotifyAlbum,
    #[serde(default)]
    pub popularity: u32,
}

/// One recently played item. `played_at` is RFC 3339.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistory {
    pub played_at: String,
    pub track: SpotifyTrack,
}

/// Paging envelope; only the items are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
}

/// Table row of the Spotify top-artists view.
#[derive(Tabled)]
pub struct SpotifyArtistRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Artist")]
    pub name: String,
    #[tabled(rename = "Genres")]
    pub genres: String,
    #[tabled(rename = "Popularity")]
    pub popularity: u32,
    #[tabled(rename = "Followers")]
    pub followers: u64,
    #[tabled(rename = "Image")]
    pub image_url: String,
}

/// Table row of the Spotify top-tracks view.
#[derive(Tabled)]
pub struct SpotifyTrackRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Track")]
    pub name: String,
    #[tabled(rename = "Artists")]
    pub artists: String,
    #[tabled(rename = "Album")]
    pub album: String,
    #[tabled(rename = "Popularity")]
    pub popularity: u32,
}

/// Table row of the recently played view.
#[derive(Tabled)]
pub struct SpotifyPlayRow {
    #[tabled(rename = "Played at")]
    pub played_at: String,
    #[tabled(rename = "Track")]
    pub name: String,
    #[tabled(rename = "Artists")]
    pub artists: String,
}
