use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use streamdash::{
    Res, cli,
    config::{self, LastFmConfig, Settings, SpotifyConfig},
    error,
    lastfm::{history::MAX_PAGE_SIZE, top::Period},
    spotify::top::TimeRange,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Rank this week's plays from Last.fm
    Week(WeekArgs),

    /// Show this week's most recent plays
    Recent(RecentArgs),

    /// Last.fm top tracks or artists for a period
    Top(TopOptions),

    /// Spotify profile views
    Spotify(SpotifyOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct WeekArgs {
    /// Records requested per page (1-200)
    #[clap(long, default_value_t = MAX_PAGE_SIZE)]
    pub page_size: u32,

    /// Give up when the whole history has not arrived after this many seconds
    #[clap(long, default_value_t = 120)]
    pub timeout: u64,

    /// Skip the per-track tag lookups
    #[clap(long)]
    pub no_tags: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RecentArgs {
    /// Number of plays to show
    #[clap(long, default_value_t = 100)]
    pub limit: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct TopOptions {
    #[command(subcommand)]
    pub command: TopSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TopSubcommand {
    /// Top tracks
    Tracks(TopArgs),
    /// Top artists
    Artists(TopArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct TopArgs {
    /// 7day, 1month, 3month, 6month, 12month or overall
    #[clap(long, default_value = "7day")]
    pub period: Period,

    /// Number of entries to show
    #[clap(long, default_value_t = 50)]
    pub limit: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct SpotifyOptions {
    #[command(subcommand)]
    pub command: SpotifySubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SpotifySubcommand {
    /// Authorize with Spotify API
    Auth,
    /// Your top artists on Spotify
    TopArtists(RangeArgs),
    /// Your top tracks on Spotify
    TopTracks(RangeArgs),
    /// Recently played on Spotify
    Recent,
}

#[derive(Parser, Debug, Clone)]
pub struct RangeArgs {
    /// short, medium or long
    #[clap(long, default_value = "medium")]
    pub time_range: TimeRange,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        error!("{}", e);
    }
}

async fn run(command: Command) -> Res<()> {
    match command {
        Command::Week(args) => {
            let opts = cli::WeekOptions {
                page_size: args.page_size,
                timeout_secs: args.timeout,
                tags: !args.no_tags,
            };
            cli::week(LastFmConfig::from_env()?, &Settings::from_env()?, opts).await
        }
        Command::Recent(args) => {
            cli::recent(LastFmConfig::from_env()?, &Settings::from_env()?, args.limit).await
        }
        Command::Top(opt) => match opt.command {
            TopSubcommand::Tracks(a) => {
                cli::top_tracks(LastFmConfig::from_env()?, a.period, a.limit).await
            }
            TopSubcommand::Artists(a) => {
                cli::top_artists(LastFmConfig::from_env()?, a.period, a.limit).await
            }
        },
        Command::Spotify(opt) => {
            let config = SpotifyConfig::from_env()?;
            match opt.command {
                SpotifySubcommand::Auth => cli::spotify_auth(config).await,
                SpotifySubcommand::TopArtists(a) => {
                    cli::spotify_top_artists(config, a.time_range).await
                }
                SpotifySubcommand::TopTracks(a) => {
                    cli::spotify_top_tracks(config, a.time_range).await
                }
                SpotifySubcommand::Recent => {
                    cli::spotify_recent(config, &Settings::from_env()?).await
                }
            }
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}
