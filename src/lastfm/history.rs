//! Listening history from `user.getRecentTracks`.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{
    error::FetchError,
    lastfm::{
        ScrobbleTransport, call,
        payload::{RecentTrackRecord, RecentTracksResponse, decode_records, is_now_playing},
    },
    normalize::{RawRecord, normalize_all},
    types::PlayEvent,
};

/// Largest `limit` the endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Upper bound on paging requests for a single fetch, whatever the server
/// claims the total is.
pub const MAX_PAGES: u32 = 5_000;

/// One decoded page of recent tracks.
#[derive(Debug, Clone)]
pub struct RecentTracksPage {
    /// Completed plays, in server order. The now-playing entry is removed.
    pub records: Vec<RawRecord>,
    /// Number of entries dropped because they were still playing.
    pub now_playing: usize,
    /// Completed entries that could not be decoded at all.
    pub undecodable: usize,
    /// Server-reported total across all pages.
    pub total: u64,
}

impl RecentTracksPage {
    /// Completed plays this page delivered, usable or not.
    pub fn received(&self) -> u64 {
        (self.records.len() + self.undecodable) as u64
    }
}

/// Requests one page of a user's plays since `from`.
pub async fn fetch_page<T>(
    transport: &T,
    user: &str,
    from: DateTime<Utc>,
    limit: u32,
    page: u32,
) -> Result<RecentTracksPage, FetchError>
where
    T: ScrobbleTransport,
{
    let params = [
        ("method", "user.getRecentTracks".to_string()),
        ("user", user.to_string()),
        ("from", from.timestamp().to_string()),
        ("limit", limit.to_string()),
        ("page", page.to_string()),
    ];

    let res: RecentTracksResponse = call(transport, &params).await?;

    let total = match res.recenttracks.attr.total.as_deref() {
        Some(total) => total
            .trim()
            .parse::<u64>()
            .map_err(|_| FetchError::Unexpected(format!("total is not a number: {total:?}")))?,
        None => {
            return Err(FetchError::Unexpected(
                "recenttracks response without a total".to_string(),
            ));
        }
    };

    let (playing, completed): (Vec<_>, Vec<_>) =
        res.recenttracks.track.into_iter().partition(is_now_playing);
    for entry in &playing {
        log::debug!(
            "Excluding now playing track {} on page {}",
            entry.get("name").unwrap_or(&serde_json::Value::Null),
            page
        );
    }

    let (records, undecodable) = decode_records::<RecentTrackRecord>(completed, "recent track");

    Ok(RecentTracksPage {
        records: records.into_iter().map(RawRecord::Recent).collect(),
        now_playing: playing.len(),
        undecodable,
        total,
    })
}

/// Asks the server how many plays a user has since `from`.
///
/// Uses a single-entry page, so only the `total` attribute is transferred.
pub async fn fetch_total<T>(transport: &T, user: &str, from: DateTime<Utc>) -> Result<u64, FetchError>
where
    T: ScrobbleTransport,
{
    Ok(fetch_page(transport, user, from, 1, 1).await?.total)
}

/// Fetches every play of `user` since `from`, oldest page last.
///
/// A single-entry request reads the total, then pages of `page_size` are requested
/// from page 1 upwards until the number of completed records received
/// reaches that total. The loop ends on the running count, not on an empty
/// page, and is capped at one page more than the total requires (and never
/// more than [`MAX_PAGES`]) so an over-reporting server cannot keep it going.
///
/// Malformed records still count towards the total but are skipped in the
/// result. `progress` is called after each page with the number of records
/// received so far and the total.
///
/// Any failed request aborts the fetch; no partial result is returned.
pub async fn fetch_plays_since<T, P>(
    transport: &T,
    user: &str,
    from: DateTime<Utc>,
    page_size: u32,
    mut progress: P,
) -> Result<Vec<PlayEvent>, FetchError>
where
    T: ScrobbleTransport,
    P: FnMut(u64, u64),
{
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

    let total = fetch_total(transport, user, from).await?;
    log::debug!("{user} has {total} plays since {from}");

    let mut events: Vec<PlayEvent> = Vec::new();
    if total == 0 {
        return Ok(events);
    }

    let max_pages = total
        .div_ceil(page_size as u64)
        .saturating_add(1)
        .min(MAX_PAGES as u64) as u32;

    let mut received: u64 = 0;
    let mut page: u32 = 1;

    while received < total {
        if page > max_pages {
            log::warn!(
                "Stopping after {} pages with {received} of {total} plays received",
                max_pages
            );
            break;
        }

        let res = fetch_page(transport, user, from, page_size, page).await?;
        received += res.received();
        events.extend(normalize_all(res.records));

        progress(received, total);
        page += 1;
    }

    Ok(events)
}

/// [`fetch_plays_since`] bounded by a wall-clock budget for the whole fetch.
///
/// Running out of time drops everything received so far and returns
/// [`FetchError::Timeout`].
pub async fn fetch_plays_within<T, P>(
    transport: &T,
    user: &str,
    from: DateTime<Utc>,
    page_size: u32,
    budget: Duration,
    progress: P,
) -> Result<Vec<PlayEvent>, FetchError>
where
    T: ScrobbleTransport,
    P: FnMut(u64, u64),
{
    let fetch = fetch_plays_since(transport, user, from, page_size, progress);
    match tokio::time::timeout(budget, fetch).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(budget.as_secs())),
    }
}

/// The latest `limit` completed plays since `from`, from a single page.
pub async fn fetch_recently_played<T>(
    transport: &T,
    user: &str,
    from: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<PlayEvent>, FetchError>
where
    T: ScrobbleTransport,
{
    let res = fetch_page(transport, user, from, limit.clamp(1, MAX_PAGE_SIZE), 1).await?;
    Ok(normalize_all(res.records))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        aggregate::rank_plays,
        lastfm::{MockScrobbleTransport, param},
    };

    fn from() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn track(n: u64) -> Value {
        json!({
            "name": format!("Track {}", n % 7),
            "artist": {"#text": format!("Artist {}", n % 3)},
            "album": {"#text": "Album"},
            "date": {"uts": (1_700_000_000 + n).to_string()}
        })
    }

    fn now_playing() -> Value {
        json!({
            "name": "Still Going",
            "artist": {"#text": "Artist 0"},
            "album": {"#text": "Album"},
            "@attr": {"nowplaying": "true"}
        })
    }

    fn page(tracks: Vec<Value>, total: u64) -> Value {
        json!({
            "recenttracks": {
                "track": tracks,
                "@attr": {"total": total.to_string()}
            }
        })
    }

    fn tracks(range: std::ops::Range<u64>) -> Vec<Value> {
        range.map(track).collect()
    }

    // Answers the request with this `limit` and `page` exactly once
    fn expect_page(mock: &mut MockScrobbleTransport, limit: &str, page: &str, body: Value) {
        let (limit, page) = (limit.to_string(), page.to_string());
        mock.expect_get()
            .withf(move |params| {
                param(params, "limit") == Some(limit.as_str())
                    && param(params, "page") == Some(page.as_str())
            })
            .times(1)
            .returning(move |_| Ok(body.clone()));
    }

    fn expect_total_request(mock: &mut MockScrobbleTransport, total: u64) {
        expect_page(mock, "1", "1", page(tracks(0..1), total));
    }

    #[tokio::test]
    async fn zero_total_issues_only_the_total_request() {
        let mut transport = MockScrobbleTransport::new();
        expect_page(&mut transport, "1", "1", page(vec![], 0));

        let events = fetch_plays_since(&transport, "someone", from(), 200, |_, _| {})
            .await
            .unwrap();

        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn fetches_all_pages_up_to_total() {
        let mut transport = MockScrobbleTransport::new();
        expect_total_request(&mut transport, 250);
        expect_page(&mut transport, "200", "1", page(tracks(0..200), 250));
        expect_page(&mut transport, "200", "2", page(tracks(200..250), 250));

        let mut reports = Vec::new();
        let events = fetch_plays_since(&transport, "someone", from(), 200, |received, total| {
            reports.push((received, total))
        })
        .await
        .unwrap();

        assert_eq!(events.len(), 250);
        assert_eq!(reports, vec![(200, 250), (250, 250)]);

        let streams: u64 = rank_plays(&events).iter().map(|t| t.stream_count).sum();
        assert_eq!(streams, 250);
    }

    #[tokio::test]
    async fn request_carries_user_and_window() {
        let mut transport = MockScrobbleTransport::new();
        transport
            .expect_get()
            .withf(|params| {
                param(params, "method") == Some("user.getRecentTracks")
                    && param(params, "user") == Some("someone")
                    && param(params, "from") == Some("1700000000")
            })
            .times(1)
            .returning(|_| Ok(page(vec![], 0)));

        fetch_plays_since(&transport, "someone", from(), 50, |_, _| {})
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn page_size_is_clamped() {
        let mut transport = MockScrobbleTransport::new();
        expect_total_request(&mut transport, 2);
        expect_page(&mut transport, "200", "1", page(tracks(0..2), 2));

        let events = fetch_plays_since(&transport, "someone", from(), 1_000, |_, _| {})
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn now_playing_is_excluded() {
        let mut transport = MockScrobbleTransport::new();
        let mut first = vec![now_playing()];
        first.extend(tracks(0..2));
        expect_total_request(&mut transport, 2);
        expect_page(&mut transport, "200", "1", page(first, 2));

        let events = fetch_plays_since(&transport, "someone", from(), 200, |_, _| {})
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.played_at.is_some()));
        assert!(events.iter().all(|e| e.track_name != "Still Going"));
    }

    #[tokio::test]
    async fn over_reported_total_stops_at_the_cap() {
        let mut transport = MockScrobbleTransport::new();
        expect_total_request(&mut transport, 300);
        expect_page(&mut transport, "200", "1", page(tracks(0..200), 300));
        expect_page(&mut transport, "200", "2", page(vec![], 300));
        // ceil(300 / 200) + 1 paging requests
        expect_page(&mut transport, "200", "3", page(vec![], 300));

        let events = fetch_plays_since(&transport, "someone", from(), 200, |_, _| {})
            .await
            .unwrap();

        assert_eq!(events.len(), 200);
    }

    #[tokio::test]
    async fn malformed_records_are_skipped_but_counted() {
        let mut transport = MockScrobbleTransport::new();
        let mut records = tracks(0..2);
        records.insert(1, json!({"name": "No Artist", "date": {"uts": "1700000001"}}));
        expect_total_request(&mut transport, 3);
        expect_page(&mut transport, "200", "1", page(records, 3));

        let events = fetch_plays_since(&transport, "someone", from(), 200, |_, _| {})
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn wrongly_typed_record_is_skipped_but_counted() {
        let mut transport = MockScrobbleTransport::new();
        let records = vec![
            track(0),
            json!({"name": 12345, "artist": {"#text": "X"}, "date": {"uts": "1700000001"}}),
            track(2),
        ];
        expect_total_request(&mut transport, 3);
        expect_page(&mut transport, "200", "1", page(records, 3));

        let mut reports = Vec::new();
        let events = fetch_plays_since(&transport, "someone", from(), 200, |received, total| {
            reports.push((received, total))
        })
        .await
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(reports, vec![(3, 3)]);
    }

    #[tokio::test]
    async fn failed_page_aborts_the_fetch() {
        let mut transport = MockScrobbleTransport::new();
        expect_total_request(&mut transport, 400);
        expect_page(&mut transport, "200", "1", page(tracks(0..200), 400));
        transport
            .expect_get()
            .withf(|params| param(params, "page") == Some("2"))
            .times(1)
            .returning(|_| {
                Err(FetchError::Status {
                    status: reqwest::StatusCode::BAD_GATEWAY,
                    body: String::new(),
                })
            });

        let err = fetch_plays_since(&transport, "someone", from(), 200, |_, _| {})
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { .. }));
    }

    #[tokio::test]
    async fn missing_total_is_unexpected() {
        let mut transport = MockScrobbleTransport::new();
        transport
            .expect_get()
            .times(1)
            .returning(|_| Ok(json!({"recenttracks": {"track": []}})));

        let err = fetch_total(&transport, "someone", from()).await.unwrap_err();
        assert!(matches!(err, FetchError::Unexpected(_)));
    }

    #[tokio::test]
    async fn recently_played_reads_one_page() {
        let mut transport = MockScrobbleTransport::new();
        let mut records = vec![now_playing()];
        records.extend(tracks(0..3));
        expect_page(&mut transport, "100", "1", page(records, 3));

        let events = fetch_recently_played(&transport, "someone", from(), 100)
            .await
            .unwrap();

        assert_eq!(events.len(), 3);
    }

    // Never answers, like a server that accepted the connection and hung
    struct Stalled;

    impl ScrobbleTransport for Stalled {
        async fn get(&self, _params: &[(&'static str, String)]) -> Result<Value, FetchError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_fetch_times_out() {
        let mut reports = Vec::new();
        let err = fetch_plays_within(
            &Stalled,
            "someone",
            from(),
            200,
            Duration::from_secs(30),
            |received, total| reports.push((received, total)),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FetchError::Timeout(30)));
        assert!(reports.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_within_budget_returns_plays() {
        let mut transport = MockScrobbleTransport::new();
        expect_total_request(&mut transport, 2);
        expect_page(&mut transport, "200", "1", page(tracks(0..2), 2));

        let events = fetch_plays_within(
            &transport,
            "someone",
            from(),
            200,
            Duration::from_secs(30),
            |_, _| {},
        )
        .await
        .unwrap();

        assert_eq!(events.len(), 2);
    }
}
