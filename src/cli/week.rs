use std::time::Duration;

use chrono::Utc;
use tabled::Table;

use crate::{
    Res,
    aggregate::{artist_representation, rank_plays},
    config::{LastFmConfig, Settings},
    info,
    lastfm::{LastFmClient, history::fetch_plays_within, tags::collect_tags},
    success,
    types::{ArtistShareRow, RankedTrackRow, TagRow},
    utils::{LASTFM_TIME_FORMAT, format_in_zone, format_percent, week_start},
    warning,
};

use super::spinner;

#[derive(Debug, Clone)]
pub struct WeekOptions {
    pub page_size: u32,
    pub timeout_secs: u64,
    pub tags: bool,
}

/// Ranks every play since the start of the current listening week.
pub async fn week(lastfm: LastFmConfig, settings: &Settings, opts: WeekOptions) -> Res<()> {
    let client = LastFmClient::new(lastfm);
    let from = week_start(Utc::now(), settings.timezone, settings.week_start);

    info!(
        "Plays of {} since {}",
        client.user(),
        format_in_zone(from, settings.timezone, LASTFM_TIME_FORMAT)
    );

    let pb = spinner("Fetching listening history...");
    let events = fetch_plays_within(
        &client,
        client.user(),
        from,
        opts.page_size,
        Duration::from_secs(opts.timeout_secs),
        |got, total| pb.set_message(format!("Fetched {got} of {total} plays...")),
    )
    .await;
    pb.finish_and_clear();
    let events = events?;

    if events.is_empty() {
        warning!("No plays this week yet");
        return Ok(());
    }

    let ranked = rank_plays(&events);
    success!(
        "{} plays of {} distinct tracks",
        events.len(),
        ranked.len()
    );

    let rows: Vec<RankedTrackRow> = ranked
        .iter()
        .map(|t| RankedTrackRow {
            rank: t.rank,
            track: t.track_name.clone(),
            artist: t.artist_name.clone(),
            album: t.album_name.clone(),
            streams: t.stream_count,
        })
        .collect();
    println!("{}", Table::new(rows));

    let shares: Vec<ArtistShareRow> = artist_representation(&ranked)
        .into_iter()
        .map(|s| ArtistShareRow {
            artist: s.artist_name,
            tracks: s.track_count,
            percent: format_percent(s.percent),
        })
        .collect();
    info!("Artist representation");
    println!("{}", Table::new(shares));

    if opts.tags {
        let pb = spinner("Collecting track tags...");
        let tags = collect_tags(&client, &ranked).await;
        pb.finish_and_clear();

        let rows: Vec<TagRow> = tags?
            .into_iter()
            .map(|t| TagRow {
                tag: t.tag,
                count: t.count,
            })
            .collect();

        if rows.is_empty() {
            warning!("No tags found for this week's tracks");
        } else {
            info!("Tags");
            println!("{}", Table::new(rows));
        }
    }

    Ok(())
}
