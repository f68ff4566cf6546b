use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AuthCallback {
    pub state: String,
    pub code: Option<String>,
    pub error: Option<String>,
}

/// One page of a Spotify paging object. Items can be `null` when the
/// referenced object was removed or is unavailable in the market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<Option<T>>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next: None,
            total: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPlaylistsResponse {
    pub playlists: Page<PlaylistItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    pub name: Option<String>,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackItem {
    pub track: Option<TrackRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRef {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralTracksResponse {
    #[serde(default)]
    pub tracks: Vec<Option<Track>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: Option<String>,
    pub popularity: Option<i64>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<AlbumRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralAudioFeaturesResponse {
    #[serde(default)]
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: Option<String>,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub key: Option<i64>,
    pub loudness: Option<f64>,
    pub mode: Option<i64>,
    pub speechiness: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub uri: Option<String>,
    pub track_href: Option<String>,
    pub analysis_url: Option<String>,
    pub duration_ms: Option<i64>,
    pub time_signature: Option<i64>,
}

/// A caller-supplied category name and the provider id it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub id: String,
}

impl Category {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub category: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPlaylists {
    pub category: String,
    pub playlists: Vec<PlaylistRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistTracks {
    pub category: String,
    pub playlist_id: String,
    pub track_ids: Vec<String>,
}

/// A track id together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSource {
    pub id: String,
    pub category: Option<String>,
    pub playlist_id: Option<String>,
}

impl TrackSource {
    pub fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: None,
            playlist_id: None,
        }
    }
}

/// Labels stamped onto every row of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub listened: bool,
    pub liked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackRecord {
    pub id: String,
    pub title: String,
    pub artists: String,
    pub popularity: i64,
    pub danceability: f64,
    pub energy: f64,
    pub key: i64,
    pub loudness: f64,
    pub mode: i64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub kind: String,
    pub uri: String,
    pub track_href: String,
    pub analysis_url: String,
    pub duration_ms: i64,
    pub time_signature: i64,
    pub category: Option<String>,
    pub playlist_id: Option<String>,
    pub listened: bool,
    pub liked: Option<bool>,
}

#[derive(Tabled)]
pub struct CategorySummaryRow {
    pub category: String,
    pub playlists: usize,
    pub rows: usize,
}

#[derive(Tabled)]
pub struct ConvertedFileRow {
    pub source: String,
    pub destination: String,
    pub rows: usize,
}
