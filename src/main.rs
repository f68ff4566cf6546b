use std::{num::NonZeroU32, path::PathBuf};

use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use songset::{
    catalog::{DedupScope, WalkerConfig},
    cli,
    config::{self, Settings},
    convert::ConvertPolicy,
    error,
    metadata::{ArtistSource, MissingFeatures},
    spotify::RateLimit,
    types::Category,
    utils, warning,
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
    /// Print the Spotify authorization URL
    AuthUrl,

    /// Collect your own playlists into the liked dataset
    Liked(LikedOptions),

    /// Collect category playlists into the unheard dataset
    Unheard(UnheardOptions),

    /// Convert a directory of CSV files to Parquet
    Convert(ConvertOptions),

    /// Summarize a dataset file per category
    Inspect(InspectOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct CollectArgs {
    /// Authorization code from the redirect; runs the browser flow if omitted
    #[clap(long)]
    pub code: Option<String>,

    /// Keep rows without audio features, with zeroed feature columns
    #[clap(long)]
    pub zero_fill_missing: bool,

    /// Fill the artists column from the track's own artists instead of the album's
    #[clap(long)]
    pub track_artists: bool,

    /// Maximum API requests per second
    #[clap(long, default_value_t = NonZeroU32::new(2).unwrap_or(NonZeroU32::MIN))]
    pub requests_per_second: NonZeroU32,
}

#[derive(Parser, Debug, Clone)]
pub struct LikedOptions {
    #[clap(flatten)]
    pub collect: CollectArgs,

    /// Ids per metadata request (1-50)
    #[clap(long, default_value_t = 50)]
    pub batch_size: usize,

    /// Output Parquet file; its directory must exist
    #[clap(
        long,
        default_value = "datasets/cleaned/music-recommendation-system/liked/personal-playlists.parquet"
    )]
    pub output: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct UnheardOptions {
    #[clap(flatten)]
    pub collect: CollectArgs,

    /// Category to collect as NAME=ID; can be repeated
    #[clap(
        long = "category",
        value_parser = utils::parse_category,
        action = ArgAction::Append,
        num_args = 1
    )]
    pub categories: Vec<Category>,

    /// Country code for category playlists and track market
    #[clap(long, default_value = "TW")]
    pub country: String,

    /// Playlists per category
    #[clap(long, default_value_t = 5)]
    pub limit: usize,

    /// Ids per metadata request (1-50)
    #[clap(long, default_value_t = 10)]
    pub batch_size: usize,

    /// Collect each track once per run instead of once per playlist
    #[clap(long)]
    pub dedupe_run: bool,

    /// Output Parquet file; its directory must exist
    #[clap(
        long,
        default_value = "datasets/cleaned/music-recommendation-system/unheard/categories.parquet"
    )]
    pub output: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct ConvertOptions {
    /// Directory holding the CSV files
    #[clap(default_value = "datasets/dirty/store-sales-time")]
    pub source: PathBuf,

    /// Existing directory receiving the Parquet files
    #[clap(default_value = "datasets/cleaned/store-sales-time")]
    pub dest: PathBuf,

    /// Skip files that fail instead of stopping
    #[clap(long)]
    pub keep_going: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct InspectOptions {
    file: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

impl CollectArgs {
    fn into_options(self, output: PathBuf, batch_size: usize) -> cli::CollectOptions {
        cli::CollectOptions {
            code: self.code,
            output,
            batch_size,
            missing_features: if self.zero_fill_missing {
                MissingFeatures::ZeroFill
            } else {
                MissingFeatures::Skip
            },
            artists: if self.track_artists {
                ArtistSource::Track
            } else {
                ArtistSource::Album
            },
            rate: RateLimit::per_second(self.requests_per_second),
        }
    }
}

fn settings() -> Settings {
    match Settings::from_env() {
        Ok(s) => s,
        Err(e) => error!("{}. Set it in .env or {}", e, config::data_env_path().display()),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::AuthUrl => cli::auth_url(&settings()),
        Command::Liked(opt) => {
            let options = opt.collect.into_options(opt.output, opt.batch_size);
            cli::liked(&settings(), options).await
        }
        Command::Unheard(opt) => {
            let walker_config = WalkerConfig {
                market: Some(opt.country.clone()),
                country: opt.country,
                limit: opt.limit,
                dedup: if opt.dedupe_run {
                    DedupScope::Run
                } else {
                    DedupScope::Playlist
                },
            };
            let options = opt.collect.into_options(opt.output, opt.batch_size);
            cli::unheard(&settings(), options, opt.categories, walker_config).await
        }
        Command::Convert(opt) => {
            let policy = if opt.keep_going {
                ConvertPolicy::SkipInvalid
            } else {
                ConvertPolicy::FailFast
            };
            cli::convert(&opt.source, &opt.dest, policy)
        }
        Command::Inspect(opt) => cli::inspect(&opt.file),
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
