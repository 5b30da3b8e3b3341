use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub const LASTFM_TIME_FORMAT: &str = "%d %b %Y, %H:%M %Z";
pub const SPOTIFY_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Random 128-character PKCE code verifier.
pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

/// S256 code challenge: unpadded base64url of the verifier's SHA-256.
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Start of the listening week containing `now`: midnight of the most recent
/// `first_day` in `tz`, on or before `now`. When that midnight does not exist
/// locally, the week starts at the first wall-clock minute after it that does.
pub fn week_start(now: DateTime<Utc>, tz: Tz, first_day: Weekday) -> DateTime<Utc> {
    let local = now.with_timezone(&tz);
    let days_back = (local.weekday().num_days_from_monday() + 7
        - first_day.num_days_from_monday())
        % 7;
    let date = local.date_naive() - Duration::days(days_back as i64);
    let midnight = date.and_time(NaiveTime::default());

    // midnight can fall into a DST gap in a few zones
    (0..=24 * 60)
        .find_map(|minutes| {
            tz.from_local_datetime(&(midnight + Duration::minutes(minutes)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
        .with_timezone(&Utc)
}

/// Renders `at` as wall-clock time in `tz` with a chrono format string.
pub fn format_in_zone(at: DateTime<Utc>, tz: Tz, format: &str) -> String {
    at.with_timezone(&tz).format(format).to_string()
}

/// Parses an RFC 3339 timestamp and renders it in `tz`. Unparsable input is
/// returned unchanged.
pub fn reformat_rfc3339(value: &str, tz: Tz, format: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(at) => format_in_zone(at.with_timezone(&Utc), tz, format),
        Err(_) => value.to_string(),
    }
}

/// Comma-separated list, as used for artist credits.
pub fn join_names<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().collect::<Vec<_>>().join(", ")
}

/// Two decimals and a percent sign.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}
