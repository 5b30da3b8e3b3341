//! Grouping, counting and ranking of normalized plays.
//!
//! All orderings here are stable: when two groups share a count, the one
//! that appeared first in the input ranks first.

use std::collections::HashMap;

use crate::types::{ArtistShare, PlayEvent, RankedTrack, TagCount};

/// Tags that describe the listener rather than the music.
pub const IGNORED_TAGS: [&str; 5] = ["seen live", "love", "favorites", "favorite", "favorite songs"];

/// Counts occurrences of each key, keeping keys in first-seen order.
fn count_in_order<K, I>(keys: I) -> Vec<(K, u64)>
where
    K: std::hash::Hash + Eq + Clone,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, u64)> = Vec::new();

    for key in keys {
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts
}

/// Ranks history plays by how often each (track, artist, album) occurs.
///
/// Every input event counts once, so the stream counts of the result add up
/// to `events.len()`. Ranks are dense and 1-based.
pub fn rank_plays(events: &[PlayEvent]) -> Vec<RankedTrack> {
    let keys = events.iter().map(|e| {
        (
            e.track_name.clone(),
            e.artist_name.clone(),
            e.album_name.clone().unwrap_or_default(),
        )
    });

    let mut groups = count_in_order(keys);
    // sort_by is stable
    groups.sort_by(|a, b| b.1.cmp(&a.1));

    groups
        .into_iter()
        .enumerate()
        .map(|(i, ((track_name, artist_name, album_name), count))| RankedTrack {
            rank: i as u32 + 1,
            track_name,
            artist_name,
            album_name,
            stream_count: count,
        })
        .collect()
}

/// Ranks pre-aggregated top tracks in the order the server returned them.
///
/// Events without a server count are not top-track records and are left out.
pub fn rank_top_tracks(events: &[PlayEvent]) -> Vec<RankedTrack> {
    events
        .iter()
        .filter_map(|e| match e.server_play_count {
            Some(count) => Some((e, count)),
            None => {
                log::warn!(
                    "Ignoring '{}' by '{}' without a server play count",
                    e.track_name,
                    e.artist_name
                );
                None
            }
        })
        .enumerate()
        .map(|(i, (e, count))| RankedTrack {
            rank: i as u32 + 1,
            track_name: e.track_name.clone(),
            artist_name: e.artist_name.clone(),
            album_name: e.album_name.clone().unwrap_or_default(),
            stream_count: count,
        })
        .collect()
}

/// Share of each artist among the distinct tracks of a ranking.
pub fn artist_representation(ranked: &[RankedTrack]) -> Vec<ArtistShare> {
    let total = ranked.len() as f64;
    let mut counts = count_in_order(ranked.iter().map(|t| t.artist_name.clone()));
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .map(|(artist_name, track_count)| ArtistShare {
            artist_name,
            track_count,
            percent: track_count as f64 * 100.0 / total,
        })
        .collect()
}

/// Counts tags case-insensitively, dropping [`IGNORED_TAGS`] and blanks.
pub fn tag_frequencies<I, S>(tags: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let normalized = tags
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty() && !IGNORED_TAGS.contains(&t.as_str()));

    let mut counts = count_in_order(normalized);
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn play(track: &str, artist: &str, album: Option<&str>, ts: i64) -> PlayEvent {
        PlayEvent::played(
            track,
            artist,
            album.map(str::to_string),
            DateTime::from_timestamp(ts, 0).unwrap(),
        )
    }

    #[test]
    fn empty_input_yields_empty_ranking() {
        assert!(rank_plays(&[]).is_empty());
        assert!(artist_representation(&[]).is_empty());
    }

    #[test]
    fn groups_by_track_artist_and_album() {
        let events = vec![
            play("Song", "Band", Some("LP"), 1),
            play("Song", "Band", Some("Single"), 2),
            play("Song", "Band", Some("LP"), 3),
            play("Song", "Other", Some("LP"), 4),
        ];

        let ranked = rank_plays(&events);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].album_name, "LP");
        assert_eq!(ranked[0].artist_name, "Band");
        assert_eq!(ranked[0].stream_count, 2);
    }

    #[test]
    fn missing_album_groups_as_empty() {
        let events = vec![play("Song", "Band", None, 1), play("Song", "Band", None, 2)];
        let ranked = rank_plays(&events);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].album_name, "");
        assert_eq!(ranked[0].stream_count, 2);
    }

    #[test]
    fn server_order_is_kept_for_top_tracks() {
        let events = vec![
            PlayEvent::counted("B", "X", None, 5),
            PlayEvent::counted("A", "Y", None, 9),
            play("Stray", "Z", None, 1),
        ];

        let ranked = rank_top_tracks(&events);
        assert_eq!(ranked.len(), 2);
        assert_eq!((ranked[0].rank, ranked[0].track_name.as_str()), (1, "B"));
        assert_eq!(ranked[0].stream_count, 5);
        assert_eq!((ranked[1].rank, ranked[1].track_name.as_str()), (2, "A"));
    }

    #[test]
    fn artist_shares_add_up() {
        let events = vec![
            play("A", "One", None, 1),
            play("B", "Two", None, 2),
            play("C", "One", None, 3),
            play("D", "Three", None, 4),
        ];

        let shares = artist_representation(&rank_plays(&events));
        assert_eq!(shares[0].artist_name, "One");
        assert_eq!(shares[0].track_count, 2);
        assert!((shares[0].percent - 50.0).abs() < f64::EPSILON);

        let total: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn tags_are_folded_and_filtered() {
        let tags = ["Indie", "seen live", "indie", "Rock", " ", "Favorite Songs", "rock", "indie"];
        let counts = tag_frequencies(tags);
        assert_eq!(
            counts,
            vec![
                TagCount {
                    tag: "indie".to_string(),
                    count: 3
                },
                TagCount {
                    tag: "rock".to_string(),
                    count: 2
                },
            ]
        );
    }
}
