use tabled::Table;

use crate::{
    Res,
    config::LastFmConfig,
    info,
    lastfm::{
        LastFmClient,
        top::{Period, fetch_top_artists, fetch_top_tracks},
    },
    types::{TopArtistRow, TopTrackRow},
    warning,
};

use super::spinner;

pub async fn top_tracks(lastfm: LastFmConfig, period: Period, limit: u32) -> Res<()> {
    let client = LastFmClient::new(lastfm);

    let pb = spinner("Fetching top tracks...");
    let ranked = fetch_top_tracks(&client, client.user(), period, limit).await;
    pb.finish_and_clear();
    let ranked = ranked?;

    if ranked.is_empty() {
        warning!("No top tracks for {}", period.label());
        return Ok(());
    }

    let rows: Vec<TopTrackRow> = ranked
        .into_iter()
        .map(|t| TopTrackRow {
            rank: t.rank,
            track: t.track_name,
            artist: t.artist_name,
            streams: t.stream_count,
        })
        .collect();

    info!("Top tracks of {} ({})", client.user(), period.label());
    println!("{}", Table::new(rows));
    Ok(())
}

pub async fn top_artists(lastfm: LastFmConfig, period: Period, limit: u32) -> Res<()> {
    let client = LastFmClient::new(lastfm);

    let pb = spinner("Fetching top artists...");
    let artists = fetch_top_artists(&client, client.user(), period, limit).await;
    pb.finish_and_clear();
    let artists = artists?;

    if artists.is_empty() {
        warning!("No top artists for {}", period.label());
        return Ok(());
    }

    let rows: Vec<TopArtistRow> = artists
        .into_iter()
        .map(|a| TopArtistRow {
            rank: a.rank,
            artist: a.name,
            streams: a.play_count,
        })
        .collect();

    info!("Top artists of {} ({})", client.user(), period.label());
    println!("{}", Table::new(rows));
    Ok(())
}
