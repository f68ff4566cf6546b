use std::path::PathBuf;

use tabled::Table;

use crate::{
    catalog::{self, CatalogWalker, DedupScope, WalkerConfig},
    config::Settings,
    dataset::Dataset,
    error, info,
    metadata::{ArtistSource, BatcherConfig, MetadataBatcher, MissingFeatures},
    spotify::{Limiter, RateLimit, SpotifyClient},
    success,
    types::{Category, CategoryPlaylists, Labels},
    utils, warning,
};

use super::bearer_token;

/// Options shared by the `liked` and `unheard` commands.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub code: Option<String>,
    pub output: PathBuf,
    pub batch_size: usize,
    pub missing_features: MissingFeatures,
    pub artists: ArtistSource,
    pub rate: RateLimit,
}

/// Collects the user's own playlists into the liked dataset.
pub async fn liked(settings: &Settings, options: CollectOptions) {
    let client = client(settings, &options).await;
    let config = WalkerConfig {
        market: None,
        ..WalkerConfig::default()
    };
    let walker = match CatalogWalker::new(&client, config) {
        Ok(w) => w,
        Err(e) => error!("Invalid walker configuration. Err: {}", e),
    };

    let pb = utils::spinner("Fetching your playlists...");
    let resolved = walker.resolve_user_playlists().await;
    pb.finish_and_clear();

    let resolved = match resolved {
        Ok(r) => r,
        Err(e) => error!("Failed to list your playlists. Err: {}", e),
    };

    let labels = Labels {
        listened: true,
        liked: Some(true),
    };
    run(&client, &walker, resolved, &options, labels).await;
}

/// Collects category playlists into the unheard dataset.
pub async fn unheard(
    settings: &Settings,
    options: CollectOptions,
    categories: Vec<Category>,
    walker_config: WalkerConfig,
) {
    let categories = if categories.is_empty() {
        utils::default_categories()
    } else {
        categories
    };

    let client = client(settings, &options).await;
    let walker = match CatalogWalker::new(&client, walker_config) {
        Ok(w) => w,
        Err(e) => error!("Invalid walker configuration. Err: {}", e),
    };

    if walker.config().dedup == DedupScope::Run {
        info!("Tracks are collected once per run");
    }

    let pb = utils::spinner(format!("Resolving {} categories...", categories.len()));
    let resolved = walker.resolve_playlists(&categories).await;
    pb.finish_and_clear();

    if resolved.is_empty() {
        error!("No category could be resolved");
    }

    let labels = Labels {
        listened: false,
        liked: None,
    };
    run(&client, &walker, resolved, &options, labels).await;
}

async fn client(settings: &Settings, options: &CollectOptions) -> SpotifyClient {
    let token = bearer_token(settings, options.code.clone()).await;
    SpotifyClient::new(settings.api_url.clone(), token).with_limiter(Limiter::new(options.rate))
}

async fn run(
    client: &SpotifyClient,
    walker: &CatalogWalker<'_, SpotifyClient>,
    resolved: Vec<CategoryPlaylists>,
    options: &CollectOptions,
    labels: Labels,
) {
    let config = match BatcherConfig::new(options.batch_size) {
        Ok(c) => c
            .with_missing_features(options.missing_features)
            .with_artists(options.artists),
        Err(e) => error!("{}", e),
    };

    let playlist_count: usize = resolved.iter().map(|c| c.playlists.len()).sum();
    info!(
        "Found {} playlists in {} categories",
        playlist_count,
        resolved.len()
    );

    let pb = utils::spinner("Collecting track ids...");
    let collected = walker.collect_track_ids(&resolved).await;
    pb.finish_and_clear();

    let track_count = catalog::count_tracks(&collected);
    if track_count == 0 {
        warning!("No tracks found, writing an empty dataset");
    } else {
        info!(
            "Collected {} track ids from {} playlists",
            track_count,
            collected.len()
        );
    }

    let pb = utils::progress_bar(0, "Fetching metadata...");
    let batcher = MetadataBatcher::new(client, config).with_progress(pb.clone());
    let dataset = batcher.fetch_collected(&collected, labels).await;
    pb.finish_and_clear();

    let dataset: Dataset = match dataset {
        Ok(d) => d,
        Err(e) if e.is_alignment() => error!("Metadata responses are misaligned. Err: {}", e),
        Err(e) => error!("Failed to fetch metadata. Err: {}", e),
    };

    if dataset.len() < track_count {
        warning!(
            "{} tracks had no metadata and were left out",
            track_count - dataset.len()
        );
    }

    if let Err(e) = dataset.write(&options.output) {
        error!("Cannot write dataset. Err: {}", e);
    }

    println!("{}", Table::new(dataset.summary()));
    success!(
        "Wrote {} rows to {}",
        dataset.len(),
        options.output.display()
    );
}
