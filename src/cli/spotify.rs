use std::sync::Arc;

use tabled::Table;
use tokio::sync::Mutex;

use crate::{
    Res,
    config::{Settings, SpotifyConfig},
    info,
    management::TokenManager,
    spotify::{
        SpotifyClient, auth,
        recent::{RECENT_LIMIT, play_rows},
        top::{TimeRange, artist_rows, track_rows},
    },
    success, warning,
};

use super::spinner;

pub async fn spotify_auth(config: SpotifyConfig) -> Res<()> {
    info!("Opening the browser to sign in with Spotify...");
    let token = auth::auth(&config, Arc::new(Mutex::new(None))).await?;

    let token_mgr = TokenManager::new(token);
    token_mgr.persist().await?;
    success!("Authentication successful");

    let access_token = token_mgr.current_token().access_token.clone();
    greet(&SpotifyClient::new(&config, access_token)).await;
    Ok(())
}

pub async fn spotify_top_artists(config: SpotifyConfig, range: TimeRange) -> Res<()> {
    let client = signed_in(&config).await?;
    greet(&client).await;

    let pb = spinner("Fetching top artists...");
    let artists = client.top_artists(range).await;
    pb.finish_and_clear();
    let rows = artist_rows(&artists?);

    if rows.is_empty() {
        warning!("Spotify has no top artists for {}", range);
        return Ok(());
    }

    info!("Top artists ({})", range);
    println!("{}", Table::new(rows));
    Ok(())
}

pub async fn spotify_top_tracks(config: SpotifyConfig, range: TimeRange) -> Res<()> {
    let client = signed_in(&config).await?;
    greet(&client).await;

    let pb = spinner("Fetching top tracks...");
    let tracks = client.top_tracks(range).await;
    pb.finish_and_clear();
    let rows = track_rows(&tracks?);

    if rows.is_empty() {
        warning!("Spotify has no top tracks for {}", range);
        return Ok(());
    }

    info!("Top tracks ({})", range);
    println!("{}", Table::new(rows));
    Ok(())
}

pub async fn spotify_recent(config: SpotifyConfig, settings: &Settings) -> Res<()> {
    let client = signed_in(&config).await?;
    greet(&client).await;

    let pb = spinner("Fetching recently played tracks...");
    let plays = client.recently_played(RECENT_LIMIT).await;
    pb.finish_and_clear();
    let rows = play_rows(&plays?, settings.timezone);

    if rows.is_empty() {
        warning!("Nothing played on Spotify recently");
        return Ok(());
    }

    info!("Recently played");
    println!("{}", Table::new(rows));
    Ok(())
}

async fn signed_in(config: &SpotifyConfig) -> Res<SpotifyClient> {
    let mut token_mgr = TokenManager::load().await?;
    let access_token = token_mgr.get_valid_token(config).await?;
    Ok(SpotifyClient::new(config, access_token))
}

/// Greeting is cosmetic; a failing profile lookup only logs.
async fn greet(client: &SpotifyClient) {
    match client.current_user().await {
        Ok(user) => info!(
            "Hello, {}",
            user.display_name.as_deref().unwrap_or(user.id.as_str())
        ),
        Err(e) => log::warn!("Cannot load Spotify profile: {}", e),
    }
}
