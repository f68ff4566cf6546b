//! Catalog walking: categories to playlists, playlists to track ids.
//!
//! The walker is partial-failure tolerant. A category or playlist whose
//! listing fails is reported with a warning and left out of the result; the
//! remaining ones are still collected.

use std::collections::HashSet;

use crate::{
    error::{Error, Result},
    spotify::WebApi,
    types::{Category, CategoryPlaylists, PlaylistItem, PlaylistRef, PlaylistTracks, TrackSource},
    warning,
};

/// Category label given to the current user's own playlists.
pub const PERSONAL_CATEGORY: &str = "personal";

/// How far track id deduplication reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupScope {
    /// Duplicates are removed within each playlist only. A track listed in
    /// two playlists is collected twice, once per playlist.
    #[default]
    Playlist,
    /// A track is collected once per run, under the first playlist that
    /// lists it.
    Run,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Country code used to filter category playlists.
    pub country: String,
    /// Market sent with playlist track listings; `None` sends none.
    pub market: Option<String>,
    /// Maximum number of playlists requested per category.
    pub limit: usize,
    pub dedup: DedupScope,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            country: "TW".to_string(),
            market: Some("TW".to_string()),
            limit: 5,
            dedup: DedupScope::Playlist,
        }
    }
}

impl WalkerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::InvalidConfig(
                "playlist limit must be at least 1".to_string(),
            ));
        }
        if self.country.trim().is_empty() {
            return Err(Error::InvalidConfig("country must not be empty".to_string()));
        }
        Ok(())
    }
}

pub struct CatalogWalker<'a, A: WebApi> {
    api: &'a A,
    config: WalkerConfig,
}

impl<'a, A: WebApi> CatalogWalker<'a, A> {
    pub fn new(api: &'a A, config: WalkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { api, config })
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Resolves every category to at most `limit` playlist references.
    ///
    /// Categories keep their input order. A category whose listing fails is
    /// omitted from the result; a category that lists no playlists is kept
    /// with an empty list.
    pub async fn resolve_playlists(&self, categories: &[Category]) -> Vec<CategoryPlaylists> {
        let mut resolved = Vec::with_capacity(categories.len());

        for category in categories {
            match self
                .api
                .category_playlists(&category.id, &self.config.country, self.config.limit)
                .await
            {
                Ok(items) => resolved.push(CategoryPlaylists {
                    category: category.name.clone(),
                    playlists: playlist_refs(&category.name, items),
                }),
                Err(e) => warning!("Skipping category {} ({}): {}", category.name, category.id, e),
            }
        }

        resolved
    }

    /// Lists the current user's playlists under the [`PERSONAL_CATEGORY`].
    ///
    /// # Errors
    ///
    /// Propagates the listing failure; there is nothing partial to keep.
    pub async fn resolve_user_playlists(&self) -> Result<Vec<CategoryPlaylists>> {
        let items = self.api.user_playlists().await?;
        Ok(vec![CategoryPlaylists {
            category: PERSONAL_CATEGORY.to_string(),
            playlists: playlist_refs(PERSONAL_CATEGORY, items),
        }])
    }

    /// Collects the track ids of every resolved playlist.
    ///
    /// Null tracks and null ids are dropped, duplicates are removed according
    /// to the configured [`DedupScope`], and listing order is preserved. A
    /// playlist whose listing fails is omitted.
    pub async fn collect_track_ids(&self, resolved: &[CategoryPlaylists]) -> Vec<PlaylistTracks> {
        let mut collected = Vec::new();
        let mut seen_in_run = HashSet::new();

        for category in resolved {
            for playlist in &category.playlists {
                let ids = match self
                    .api
                    .playlist_track_ids(&playlist.id, self.config.market.as_deref())
                    .await
                {
                    Ok(ids) => ids,
                    Err(e) => {
                        warning!(
                            "Skipping playlist {} of category {}: {}",
                            playlist.id,
                            playlist.category,
                            e
                        );
                        continue;
                    }
                };

                let track_ids = match self.config.dedup {
                    DedupScope::Playlist => dedupe_in_order(ids, &mut HashSet::new()),
                    DedupScope::Run => dedupe_in_order(ids, &mut seen_in_run),
                };

                collected.push(PlaylistTracks {
                    category: playlist.category.clone(),
                    playlist_id: playlist.id.clone(),
                    track_ids,
                });
            }
        }

        collected
    }
}

fn playlist_refs(category: &str, items: Vec<Option<PlaylistItem>>) -> Vec<PlaylistRef> {
    items
        .into_iter()
        .flatten()
        .filter(|p| !p.id.is_empty())
        .map(|p| PlaylistRef {
            category: category.to_string(),
            id: p.id,
        })
        .collect()
}

/// Keeps the first occurrence of every non-null id that is not yet in `seen`.
pub fn dedupe_in_order<I>(ids: I, seen: &mut HashSet<String>) -> Vec<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    ids.into_iter()
        .flatten()
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Flattens collected playlists into track sources carrying provenance.
pub fn flatten(playlists: &[PlaylistTracks]) -> Vec<TrackSource> {
    playlists
        .iter()
        .flat_map(|p| {
            p.track_ids.iter().map(|id| TrackSource {
                id: id.clone(),
                category: Some(p.category.clone()),
                playlist_id: Some(p.playlist_id.clone()),
            })
        })
        .collect()
}

/// Total number of track ids across collected playlists.
pub fn count_tracks(playlists: &[PlaylistTracks]) -> usize {
    playlists.iter().map(|p| p.track_ids.len()).sum()
}
