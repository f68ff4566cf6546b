#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use songset::{
    Error, Result,
    spotify::WebApi,
    types::{AlbumRef, ArtistRef, AudioFeatures, PlaylistItem, Track},
};

/// In-memory stand-in for the Spotify Web API.
///
/// Unknown categories and playlists answer with a 404. Track and feature
/// lookups answer one entry per requested id, `None` for unknown ids, unless
/// a response override is set.
#[derive(Default)]
pub struct FakeApi {
    pub categories: HashMap<String, Vec<Option<PlaylistItem>>>,
    pub user_playlists: Vec<Option<PlaylistItem>>,
    pub playlists: HashMap<String, Vec<Option<String>>>,
    pub tracks: HashMap<String, Track>,
    pub features: HashMap<String, AudioFeatures>,
    pub tracks_override: Option<Vec<Option<Track>>>,
    pub features_override: Option<Vec<Option<AudioFeatures>>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn with_category(mut self, id: &str, playlist_ids: &[&str]) -> Self {
        let items = playlist_ids.iter().map(|p| Some(playlist(p))).collect();
        self.categories.insert(id.to_string(), items);
        self
    }

    pub fn with_playlist(mut self, id: &str, track_ids: &[Option<&str>]) -> Self {
        let ids = track_ids.iter().map(|t| t.map(str::to_string)).collect();
        self.playlists.insert(id.to_string(), ids);
        self
    }

    pub fn with_track(mut self, id: &str) -> Self {
        self.tracks.insert(id.to_string(), track(id));
        self.features.insert(id.to_string(), features(id));
        self
    }

    pub fn with_track_without_features(mut self, id: &str) -> Self {
        self.tracks.insert(id.to_string(), track(id));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn not_found() -> Error {
    Error::Http {
        status: 404,
        body: "not found".to_string(),
    }
}

#[async_trait]
impl WebApi for FakeApi {
    async fn category_playlists(
        &self,
        category_id: &str,
        country: &str,
        limit: usize,
    ) -> Result<Vec<Option<PlaylistItem>>> {
        self.record(format!("category {} {} {}", category_id, country, limit));
        let mut items = self.categories.get(category_id).cloned().ok_or_else(not_found)?;
        items.truncate(limit);
        Ok(items)
    }

    async fn user_playlists(&self) -> Result<Vec<Option<PlaylistItem>>> {
        self.record("me".to_string());
        Ok(self.user_playlists.clone())
    }

    async fn playlist_track_ids(
        &self,
        playlist_id: &str,
        market: Option<&str>,
    ) -> Result<Vec<Option<String>>> {
        self.record(format!("playlist {} {}", playlist_id, market.unwrap_or("-")));
        self.playlists.get(playlist_id).cloned().ok_or_else(not_found)
    }

    async fn several_tracks(&self, ids: &[String]) -> Result<Vec<Option<Track>>> {
        self.record(format!("tracks {}", ids.join(",")));
        if let Some(tracks) = &self.tracks_override {
            return Ok(tracks.clone());
        }
        Ok(ids.iter().map(|id| self.tracks.get(id).cloned()).collect())
    }

    async fn several_audio_features(&self, ids: &[String]) -> Result<Vec<Option<AudioFeatures>>> {
        self.record(format!("features {}", ids.join(",")));
        if let Some(features) = &self.features_override {
            return Ok(features.clone());
        }
        Ok(ids.iter().map(|id| self.features.get(id).cloned()).collect())
    }
}

pub fn playlist(id: &str) -> PlaylistItem {
    PlaylistItem {
        id: id.to_string(),
        name: Some(format!("Playlist {}", id)),
        href: None,
    }
}

pub fn track(id: &str) -> Track {
    Track {
        id: Some(id.to_string()),
        name: Some(format!("Song {}", id)),
        popularity: Some(42),
        artists: vec![
            ArtistRef {
                name: Some("Alice".to_string()),
            },
            ArtistRef {
                name: Some("Bob".to_string()),
            },
        ],
        album: Some(AlbumRef {
            artists: vec![ArtistRef {
                name: Some("Alice".to_string()),
            }],
        }),
    }
}

pub fn features(id: &str) -> AudioFeatures {
    AudioFeatures {
        id: Some(id.to_string()),
        danceability: Some(0.5),
        energy: Some(0.8),
        key: Some(5),
        loudness: Some(-6.5),
        mode: Some(1),
        speechiness: Some(0.04),
        acousticness: Some(0.1),
        instrumentalness: Some(0.0),
        liveness: Some(0.12),
        valence: Some(0.6),
        tempo: Some(120.0),
        kind: Some("audio_features".to_string()),
        uri: Some(format!("spotify:track:{}", id)),
        track_href: Some(format!("https://api.spotify.com/v1/tracks/{}", id)),
        analysis_url: Some(format!("https://api.spotify.com/v1/audio-analysis/{}", id)),
        duration_ms: Some(210_000),
        time_signature: Some(4),
    }
}
