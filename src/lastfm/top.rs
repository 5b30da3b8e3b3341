//! Server-ranked charts: `user.getTopTracks` and `user.getTopArtists`.

use std::{fmt, str::FromStr};

use crate::{
    aggregate::rank_top_tracks,
    error::FetchError,
    lastfm::{
        ScrobbleTransport, call,
        payload::{
            TopArtistRecord, TopArtistsResponse, TopTrackRecord, TopTracksResponse, decode_records,
        },
    },
    normalize::{RawRecord, normalize_all},
    types::{RankedTrack, TopArtist},
};

/// Time window of a Last.fm chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    SevenDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    TwelveMonths,
    Overall,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::SevenDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::TwelveMonths,
        Period::Overall,
    ];

    /// Value of the `period` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            Period::SevenDays => "7day",
            Period::OneMonth => "1month",
            Period::ThreeMonths => "3month",
            Period::SixMonths => "6month",
            Period::TwelveMonths => "12month",
            Period::Overall => "overall",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::SevenDays => "Last 7 days",
            Period::OneMonth => "Last month",
            Period::ThreeMonths => "Last 3 months",
            Period::SixMonths => "Last 6 months",
            Period::TwelveMonths => "Last year",
            Period::Overall => "Overall",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for Period {
    type Err = String;

    /// Accepts the API value (`3month`) or the display label (`Last 3 months`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Period::ALL
            .iter()
            .copied()
            .find(|p| {
                p.as_param().eq_ignore_ascii_case(needle) || p.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| {
                let valid = Period::ALL
                    .iter()
                    .map(|p| p.as_param())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("invalid period '{needle}'. Valid values: {valid}")
            })
    }
}

/// A user's top tracks for `period`, ranked in server order.
pub async fn fetch_top_tracks<T>(
    transport: &T,
    user: &str,
    period: Period,
    limit: u32,
) -> Result<Vec<RankedTrack>, FetchError>
where
    T: ScrobbleTransport,
{
    let params = [
        ("method", "user.getTopTracks".to_string()),
        ("user", user.to_string()),
        ("period", period.as_param().to_string()),
        ("limit", limit.to_string()),
    ];

    let res: TopTracksResponse = call(transport, &params).await?;
    let (records, _) = decode_records::<TopTrackRecord>(res.toptracks.track, "top track");
    let events = normalize_all(records.into_iter().map(RawRecord::Top));
    Ok(rank_top_tracks(&events))
}

/// A user's top artists for `period`.
///
/// The rank comes from the record's `@attr.rank` when present, otherwise
/// from its position. Records without a name or a numeric play count are
/// skipped.
pub async fn fetch_top_artists<T>(
    transport: &T,
    user: &str,
    period: Period,
    limit: u32,
) -> Result<Vec<TopArtist>, FetchError>
where
    T: ScrobbleTransport,
{
    let params = [
        ("method", "user.getTopArtists".to_string()),
        ("user", user.to_string()),
        ("period", period.as_param().to_string()),
        ("limit", limit.to_string()),
    ];

    let res: TopArtistsResponse = call(transport, &params).await?;

    let (records, _) = decode_records::<TopArtistRecord>(res.topartists.artist, "top artist");

    let artists = records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let name = record.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
            let play_count = record
                .playcount
                .as_deref()
                .and_then(|c| c.trim().parse::<u64>().ok());

            match (name, play_count) {
                (Some(name), Some(play_count)) => Some(TopArtist {
                    rank: record
                        .attr
                        .as_ref()
                        .and_then(|a| a.rank.as_deref())
                        .and_then(|r| r.parse::<u32>().ok())
                        .unwrap_or(i as u32 + 1),
                    name: name.to_string(),
                    play_count,
                }),
                _ => {
                    log::warn!("Skipping malformed top artist record {:?}", record);
                    None
                }
            }
        })
        .collect();

    Ok(artists)
}
