//! Community tags of a track, via `track.getTopTags`.

use crate::{
    aggregate::tag_frequencies,
    error::FetchError,
    lastfm::{
        ScrobbleTransport, call,
        payload::{TagRecord, TopTagsResponse, decode_records},
    },
    types::{RankedTrack, TagCount},
};

/// Tag names for one track, most used first.
pub async fn fetch_track_tags<T>(
    transport: &T,
    artist: &str,
    track: &str,
) -> Result<Vec<String>, FetchError>
where
    T: ScrobbleTransport,
{
    let params = [
        ("method", "track.getTopTags".to_string()),
        ("artist", artist.to_string()),
        ("track", track.to_string()),
    ];

    let res: TopTagsResponse = call(transport, &params).await?;
    let (tags, _) = decode_records::<TagRecord>(res.toptags.tag, "tag");
    Ok(tags.into_iter().filter_map(|t| t.name).collect())
}

/// Tag frequencies over every track of a ranking, one request per track.
///
/// Tracks Last.fm does not know about answer with an API error; those are
/// logged and contribute no tags. Transport failures abort.
pub async fn collect_tags<T>(
    transport: &T,
    ranked: &[RankedTrack],
) -> Result<Vec<TagCount>, FetchError>
where
    T: ScrobbleTransport,
{
    let mut tags: Vec<String> = Vec::new();

    for track in ranked {
        match fetch_track_tags(transport, &track.artist_name, &track.track_name).await {
            Ok(found) => tags.extend(found),
            Err(FetchError::Api { code, message }) => {
                log::warn!(
                    "No tags for '{}' by '{}': {} ({})",
                    track.track_name,
                    track.artist_name,
                    message,
                    code
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(tag_frequencies(tags))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::lastfm::{MockScrobbleTransport, param};

    fn ranked(track: &str, artist: &str) -> RankedTrack {
        RankedTrack {
            rank: 1,
            track_name: track.to_string(),
            artist_name: artist.to_string(),
            album_name: String::new(),
            stream_count: 1,
        }
    }

    fn expect_tags(mock: &mut MockScrobbleTransport, track: &'static str, body: Value) {
        mock.expect_get()
            .withf(move |params| {
                param(params, "method") == Some("track.getTopTags")
                    && param(params, "track") == Some(track)
            })
            .times(1)
            .returning(move |_| Ok(body.clone()));
    }

    #[tokio::test]
    async fn unknown_tracks_contribute_nothing() {
        let mut transport = MockScrobbleTransport::new();
        expect_tags(
            &mut transport,
            "A",
            json!({"toptags": {"tag": [{"name": "Shoegaze"}, {"name": "love"}]}}),
        );
        transport
            .expect_get()
            .withf(|params| {
                param(params, "track") == Some("B") && param(params, "artist") == Some("Y")
            })
            .times(1)
            .returning(|_| {
                Err(FetchError::Api {
                    code: 6,
                    message: "Track not found".to_string(),
                })
            });
        expect_tags(
            &mut transport,
            "C",
            json!({"toptags": {"tag": {"name": "shoegaze"}}}),
        );

        let tracks = vec![ranked("A", "X"), ranked("B", "Y"), ranked("C", "Z")];
        let counts = collect_tags(&transport, &tracks).await.unwrap();

        assert_eq!(
            counts,
            vec![TagCount {
                tag: "shoegaze".to_string(),
                count: 2
            }]
        );
    }

    #[tokio::test]
    async fn transport_failure_aborts() {
        let mut transport = MockScrobbleTransport::new();
        transport
            .expect_get()
            .times(1)
            .returning(|_| Err(FetchError::Unexpected("boom".to_string())));

        let result = collect_tags(&transport, &[ranked("A", "X")]).await;
        assert!(matches!(result, Err(FetchError::Unexpected(_))));
    }
}
