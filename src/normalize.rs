//! Maps raw Last.fm records onto [`PlayEvent`].

use chrono::DateTime;

use crate::{
    error::MalformedRecordError,
    lastfm::payload::{RecentTrackRecord, TextField, TopTrackRecord},
    types::PlayEvent,
};

/// A raw record tagged with the endpoint it came from.
#[derive(Debug, Clone)]
pub enum RawRecord {
    /// `user.getRecentTracks`: one play with a timestamp.
    Recent(RecentTrackRecord),
    /// `user.getTopTracks`: server-side play count, no timestamp.
    Top(TopTrackRecord),
}

/// Converts a raw record into a [`PlayEvent`].
///
/// Recent records yield `played_at` and no server count, top records the
/// reverse. Missing track or artist names are an error, and so are
/// unparsable timestamps or counts. An empty album becomes `None`.
pub fn normalize(record: &RawRecord) -> Result<PlayEvent, MalformedRecordError> {
    match record {
        RawRecord::Recent(r) => {
            let track_name = non_empty(r.name.as_deref())
                .ok_or(MalformedRecordError::MissingField("name"))?;
            let artist_name = non_empty(r.artist.as_ref().and_then(|a| a.text.as_deref()))
                .ok_or(MalformedRecordError::MissingField("artist"))?;

            let uts = r
                .date
                .as_ref()
                .and_then(|d| d.uts.as_deref())
                .ok_or(MalformedRecordError::MissingField("date"))?;
            let secs = uts
                .trim()
                .parse::<i64>()
                .map_err(|_| MalformedRecordError::InvalidNumber {
                    field: "date.uts",
                    value: uts.to_string(),
                })?;
            let played_at =
                DateTime::from_timestamp(secs, 0).ok_or(MalformedRecordError::InvalidNumber {
                    field: "date.uts",
                    value: uts.to_string(),
                })?;

            Ok(PlayEvent::played(
                track_name,
                artist_name,
                album_name(r.album.as_ref()),
                played_at,
            ))
        }
        RawRecord::Top(r) => {
            let track_name = non_empty(r.name.as_deref())
                .ok_or(MalformedRecordError::MissingField("name"))?;
            let artist_name = non_empty(r.artist.as_ref().and_then(|a| a.name.as_deref()))
                .ok_or(MalformedRecordError::MissingField("artist"))?;

            let raw_count = r
                .playcount
                .as_deref()
                .ok_or(MalformedRecordError::MissingField("playcount"))?;
            let count = raw_count
                .trim()
                .parse::<u64>()
                .map_err(|_| MalformedRecordError::InvalidNumber {
                    field: "playcount",
                    value: raw_count.to_string(),
                })?;

            Ok(PlayEvent::counted(
                track_name,
                artist_name,
                album_name(r.album.as_ref()),
                count,
            ))
        }
    }
}

/// Normalizes a batch and drops records that fail, logging each drop.
pub fn normalize_all<I>(records: I) -> Vec<PlayEvent>
where
    I: IntoIterator<Item = RawRecord>,
{
    records
        .into_iter()
        .filter_map(|record| match normalize(&record) {
            Ok(event) => Some(event),
            Err(e) => {
                log::warn!("Skipping malformed record {:?}: {}", record, e);
                None
            }
        })
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn album_name(album: Option<&TextField>) -> Option<String> {
    non_empty(album.and_then(|a| a.text.as_deref()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::lastfm::payload::{NamedField, RecentDate};

    fn text(value: &str) -> Option<TextField> {
        Some(TextField {
            text: Some(value.to_string()),
        })
    }

    fn recent(name: &str, artist: &str, album: &str, uts: &str) -> RecentTrackRecord {
        RecentTrackRecord {
            name: Some(name.to_string()),
            artist: text(artist),
            album: text(album),
            date: Some(RecentDate {
                uts: Some(uts.to_string()),
            }),
        }
    }

    fn top(name: &str, artist: &str, playcount: &str) -> TopTrackRecord {
        TopTrackRecord {
            name: Some(name.to_string()),
            artist: Some(NamedField {
                name: Some(artist.to_string()),
            }),
            album: None,
            playcount: Some(playcount.to_string()),
            attr: None,
        }
    }

    #[test]
    fn recent_record_gets_timestamp() {
        let record = recent("Song", "Band", "LP", "1700000000");
        let event = normalize(&RawRecord::Recent(record)).unwrap();
        assert_eq!(event.track_name, "Song");
        assert_eq!(event.artist_name, "Band");
        assert_eq!(event.album_name.as_deref(), Some("LP"));
        assert_eq!(
            event.played_at,
            Some(chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap())
        );
        assert_eq!(event.server_play_count, None);
    }

    #[test]
    fn top_record_gets_server_count() {
        let event = normalize(&RawRecord::Top(top("Song", "Band", " 42"))).unwrap();
        assert_eq!(event.server_play_count, Some(42));
        assert_eq!(event.played_at, None);
        assert_eq!(event.album_name, None);
    }

    #[test]
    fn empty_album_is_none() {
        let event = normalize(&RawRecord::Recent(recent("Song", "Band", "", "1"))).unwrap();
        assert_eq!(event.album_name, None);
    }

    #[test]
    fn missing_artist_is_malformed() {
        let mut record = recent("Song", "", "LP", "1");
        assert_eq!(
            normalize(&RawRecord::Recent(record.clone())),
            Err(MalformedRecordError::MissingField("artist"))
        );

        record.artist = None;
        assert_eq!(
            normalize(&RawRecord::Recent(record)),
            Err(MalformedRecordError::MissingField("artist"))
        );
    }

    #[test]
    fn missing_track_name_is_malformed() {
        let mut record = top("Song", "Band", "3");
        record.name = None;
        assert_eq!(
            normalize(&RawRecord::Top(record)),
            Err(MalformedRecordError::MissingField("name"))
        );
    }

    #[test]
    fn bad_play_count_is_malformed() {
        let err = normalize(&RawRecord::Top(top("Song", "Band", "lots"))).unwrap_err();
        assert_eq!(
            err,
            MalformedRecordError::InvalidNumber {
                field: "playcount",
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn recent_without_date_is_malformed() {
        let mut record = recent("Song", "Band", "LP", "1");
        record.date = None;
        assert_eq!(
            normalize(&RawRecord::Recent(record)),
            Err(MalformedRecordError::MissingField("date"))
        );
    }

    #[test]
    fn normalize_all_skips_bad_records() {
        let records = vec![
            RawRecord::Recent(recent("A", "X", "", "10")),
            RawRecord::Recent(recent("B", "", "", "11")),
            RawRecord::Recent(recent("C", "Z", "", "12")),
        ];
        let events = normalize_all(records);
        let names: Vec<&str> = events.iter().map(|e| e.track_name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}
