//! Batched metadata retrieval.
//!
//! Track ids are split into contiguous batches. Each batch costs two
//! lookups, one for track attributes and one for audio features, whose
//! responses are merged position by position into [`TrackRecord`]s.
//!
//! The merge refuses to guess: if the two responses do not line up with the
//! requested ids, the batch fails with [`Error::BatchAlignment`] (or
//! [`Error::MismatchedPair`]) and nothing from it reaches the dataset.

use indicatif::ProgressBar;

use crate::{
    catalog,
    dataset::Dataset,
    error::{Error, Result},
    spotify::WebApi,
    types::{ArtistRef, AudioFeatures, Labels, PlaylistTracks, Track, TrackRecord, TrackSource},
};

/// Largest batch the track attributes endpoint accepts.
pub const MAX_BATCH_SIZE: usize = 50;

/// What to do with a row whose audio features are absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFeatures {
    /// Omit the row.
    #[default]
    Skip,
    /// Keep the row with every audio feature set to zero.
    ZeroFill,
}

/// Which artist list fills the `artists` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtistSource {
    /// Artists credited on the track's album.
    #[default]
    Album,
    /// The track's own artists, featured ones included. Falls back to the
    /// album artists when the track lists none.
    Track,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatcherConfig {
    pub batch_size: usize,
    pub missing_features: MissingFeatures,
    pub artists: ArtistSource,
}

impl BatcherConfig {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] unless `1 <= batch_size <= 50`.
    pub fn new(batch_size: usize) -> Result<Self> {
        if !(1..=MAX_BATCH_SIZE).contains(&batch_size) {
            return Err(Error::InvalidConfig(format!(
                "batch size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, batch_size
            )));
        }
        Ok(Self {
            batch_size,
            missing_features: MissingFeatures::default(),
            artists: ArtistSource::default(),
        })
    }

    pub fn with_missing_features(mut self, policy: MissingFeatures) -> Self {
        self.missing_features = policy;
        self
    }

    pub fn with_artists(mut self, source: ArtistSource) -> Self {
        self.artists = source;
        self
    }
}

/// Splits `items` into contiguous batches of at most `batch_size` entries.
///
/// Yields `ceil(len / batch_size)` batches. A `batch_size` of zero is
/// treated as one.
pub fn partition<T>(items: &[T], batch_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(batch_size.max(1))
}

/// Merges the paired responses of one batch into records.
///
/// `tracks` and `features` must both have one entry per requested source.
/// Positions whose track is absent are omitted; positions whose features are
/// absent follow `config.missing_features`.
///
/// # Errors
///
/// - [`Error::BatchAlignment`] if either response length differs from the
///   number of requested ids
/// - [`Error::MismatchedPair`] if a track and its audio features carry
///   different ids
pub fn merge_batch(
    batch: usize,
    sources: &[TrackSource],
    tracks: Vec<Option<Track>>,
    features: Vec<Option<AudioFeatures>>,
    labels: Labels,
    config: &BatcherConfig,
) -> Result<Vec<TrackRecord>> {
    if tracks.len() != features.len() || tracks.len() != sources.len() {
        return Err(Error::BatchAlignment {
            batch,
            requested: sources.len(),
            tracks: tracks.len(),
            features: features.len(),
        });
    }

    let mut records = Vec::with_capacity(sources.len());
    for ((source, track), feature) in sources.iter().zip(tracks).zip(features) {
        let Some(track) = track else {
            continue;
        };

        let feature = match (feature, config.missing_features) {
            (Some(feature), _) => feature,
            (None, MissingFeatures::Skip) => continue,
            (None, MissingFeatures::ZeroFill) => AudioFeatures::default(),
        };

        if let (Some(track_id), Some(feature_id)) = (&track.id, &feature.id) {
            if track_id != feature_id {
                return Err(Error::MismatchedPair {
                    batch,
                    track_id: track_id.clone(),
                    feature_id: feature_id.clone(),
                });
            }
        }

        records.push(build_record(source, &track, &feature, labels, config.artists));
    }

    Ok(records)
}

/// Builds one row from a track, its audio features and its provenance.
/// Missing numbers become 0 and missing strings become empty.
pub fn build_record(
    source: &TrackSource,
    track: &Track,
    features: &AudioFeatures,
    labels: Labels,
    artists: ArtistSource,
) -> TrackRecord {
    TrackRecord {
        id: track.id.clone().unwrap_or_else(|| source.id.clone()),
        title: track.name.clone().unwrap_or_default(),
        artists: artist_names(track, artists),
        popularity: track.popularity.unwrap_or_default(),
        danceability: features.danceability.unwrap_or_default(),
        energy: features.energy.unwrap_or_default(),
        key: features.key.unwrap_or_default(),
        loudness: features.loudness.unwrap_or_default(),
        mode: features.mode.unwrap_or_default(),
        speechiness: features.speechiness.unwrap_or_default(),
        acousticness: features.acousticness.unwrap_or_default(),
        instrumentalness: features.instrumentalness.unwrap_or_default(),
        liveness: features.liveness.unwrap_or_default(),
        valence: features.valence.unwrap_or_default(),
        tempo: features.tempo.unwrap_or_default(),
        kind: features.kind.clone().unwrap_or_default(),
        uri: features.uri.clone().unwrap_or_default(),
        track_href: features.track_href.clone().unwrap_or_default(),
        analysis_url: features.analysis_url.clone().unwrap_or_default(),
        duration_ms: features.duration_ms.unwrap_or_default(),
        time_signature: features.time_signature.unwrap_or_default(),
        category: source.category.clone(),
        playlist_id: source.playlist_id.clone(),
        listened: labels.listened,
        liked: labels.liked,
    }
}

/// Artist names of a track joined by `", "`, taken from `source`.
pub fn artist_names(track: &Track, source: ArtistSource) -> String {
    let names = |artists: &[ArtistRef]| {
        artists
            .iter()
            .filter_map(|a| a.name.as_deref())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let album = || {
        track
            .album
            .as_ref()
            .map(|album| names(&album.artists))
            .unwrap_or_default()
    };

    match source {
        ArtistSource::Album => album(),
        ArtistSource::Track => {
            let own = names(&track.artists);
            if own.is_empty() { album() } else { own }
        }
    }
}

pub struct MetadataBatcher<'a, A: WebApi> {
    api: &'a A,
    config: BatcherConfig,
    progress: Option<ProgressBar>,
}

impl<'a, A: WebApi> MetadataBatcher<'a, A> {
    pub fn new(api: &'a A, config: BatcherConfig) -> Self {
        Self {
            api,
            config,
            progress: None,
        }
    }

    /// Reports one tick per batch on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    /// Fetches metadata for bare track ids; rows carry no provenance.
    pub async fn fetch_metadata(&self, track_ids: &[String], labels: Labels) -> Result<Dataset> {
        let sources: Vec<TrackSource> = track_ids.iter().map(TrackSource::bare).collect();
        self.fetch_sources(&sources, labels).await
    }

    /// Fetches metadata for every collected playlist, keeping each row's
    /// category and playlist id.
    pub async fn fetch_collected(
        &self,
        playlists: &[PlaylistTracks],
        labels: Labels,
    ) -> Result<Dataset> {
        let sources = catalog::flatten(playlists);
        self.fetch_sources(&sources, labels).await
    }

    /// Fetches metadata for `sources` batch by batch.
    ///
    /// # Errors
    ///
    /// Any lookup or alignment failure aborts the run.
    pub async fn fetch_sources(&self, sources: &[TrackSource], labels: Labels) -> Result<Dataset> {
        let mut dataset = Dataset::new();

        if let Some(pb) = &self.progress {
            pb.set_length(partition(sources, self.config.batch_size).len() as u64);
        }

        for (index, batch) in partition(sources, self.config.batch_size).enumerate() {
            let appended = self.append_batch(&mut dataset, index, batch, labels).await?;

            if let Some(pb) = &self.progress {
                pb.set_message(format!(
                    "batch {} added {}/{} rows",
                    index + 1,
                    appended,
                    batch.len()
                ));
                pb.inc(1);
            }
        }

        Ok(dataset)
    }

    /// Fetches and merges a single batch, appending its rows to `dataset`.
    ///
    /// Returns the number of appended rows. On error `dataset` is unchanged.
    pub async fn append_batch(
        &self,
        dataset: &mut Dataset,
        index: usize,
        batch: &[TrackSource],
        labels: Labels,
    ) -> Result<usize> {
        let ids: Vec<String> = batch.iter().map(|s| s.id.clone()).collect();

        let tracks = self.api.several_tracks(&ids).await?;
        let features = self.api.several_audio_features(&ids).await?;

        let records = merge_batch(
            index,
            batch,
            tracks,
            features,
            labels,
            &self.config,
        )?;

        let appended = records.len();
        dataset.extend(records);
        Ok(appended)
    }
}
