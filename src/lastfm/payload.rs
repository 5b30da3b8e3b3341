//! Raw JSON shapes returned by the Last.fm 2.0 API.
//!
//! Record lists are kept as raw JSON values and decoded one by one with
//! [`decode_records`], so one bad record never fails the whole page. Fields
//! a record may lack are `Option`s; whether a decoded record is usable is
//! decided by [`crate::normalize`].

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

/// Last.fm collapses single-element lists into a bare object.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

/// Decodes each raw record on its own. Records of the wrong shape are
/// logged and counted instead of failing their page.
pub fn decode_records<T>(values: Vec<Value>, kind: &str) -> (Vec<T>, usize)
where
    T: DeserializeOwned,
{
    let mut skipped = 0;
    let records = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping undecodable {kind} record {value}: {e}");
                skipped += 1;
                None
            }
        })
        .collect();
    (records, skipped)
}

/// Whether a raw recent-track entry is the track playing right now. Such an
/// entry has no completed timestamp yet.
pub fn is_now_playing(value: &Value) -> bool {
    value
        .pointer("/@attr/nowplaying")
        .and_then(Value::as_str)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Error envelope, returned with status 200 on some failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextField {
    #[serde(rename = "#text")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedField {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentDate {
    pub uts: Option<String>,
}

/// One entry of `user.getRecentTracks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentTrackRecord {
    pub name: Option<String>,
    pub artist: Option<TextField>,
    pub album: Option<TextField>,
    pub date: Option<RecentDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankAttr {
    pub rank: Option<String>,
}

/// One entry of `user.getTopTracks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopTrackRecord {
    pub name: Option<String>,
    pub artist: Option<NamedField>,
    pub album: Option<TextField>,
    pub playcount: Option<String>,
    #[serde(rename = "@attr")]
    pub attr: Option<RankAttr>,
}

/// One entry of `user.getTopArtists`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopArtistRecord {
    pub name: Option<String>,
    pub playcount: Option<String>,
    #[serde(rename = "@attr")]
    pub attr: Option<RankAttr>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagRecord {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageAttr {
    pub total: Option<String>,
    #[serde(rename = "totalPages")]
    pub total_pages: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentTracks {
    #[serde(default, deserialize_with = "one_or_many")]
    pub track: Vec<Value>,
    #[serde(rename = "@attr", default)]
    pub attr: PageAttr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentTracksResponse {
    pub recenttracks: RecentTracks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopTracks {
    #[serde(default, deserialize_with = "one_or_many")]
    pub track: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopTracksResponse {
    pub toptracks: TopTracks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopArtists {
    #[serde(default, deserialize_with = "one_or_many")]
    pub artist: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopArtistsResponse {
    pub topartists: TopArtists,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopTags {
    #[serde(default, deserialize_with = "one_or_many")]
    pub tag: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopTagsResponse {
    pub toptags: TopTags,
}
