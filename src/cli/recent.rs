use chrono::Utc;
use tabled::Table;

use crate::{
    Res,
    config::{LastFmConfig, Settings},
    info,
    lastfm::{LastFmClient, history::fetch_recently_played},
    types::RecentTrackRow,
    utils::{LASTFM_TIME_FORMAT, format_in_zone, week_start},
    warning,
};

use super::spinner;

pub async fn recent(lastfm: LastFmConfig, settings: &Settings, limit: u32) -> Res<()> {
    let client = LastFmClient::new(lastfm);
    let from = week_start(Utc::now(), settings.timezone, settings.week_start);

    let pb = spinner("Fetching recently played tracks...");
    let plays = fetch_recently_played(&client, client.user(), from, limit).await;
    pb.finish_and_clear();
    let plays = plays?;

    if plays.is_empty() {
        warning!("No plays this week yet");
        return Ok(());
    }

    let rows: Vec<RecentTrackRow> = plays
        .into_iter()
        .map(|p| RecentTrackRow {
            track: p.track_name,
            artist: p.artist_name,
            album: p.album_name.unwrap_or_default(),
            listened_at: p
                .played_at
                .map(|at| format_in_zone(at, settings.timezone, LASTFM_TIME_FORMAT))
                .unwrap_or_default(),
        })
        .collect();

    info!("Recently played by {}", client.user());
    println!("{}", Table::new(rows));
    Ok(())
}
