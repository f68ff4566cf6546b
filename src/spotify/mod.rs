//! # Spotify Integration Module
//!
//! This module is the integration layer between songset and the Spotify Web
//! API. It covers the authorization-code flow, the catalog and metadata
//! endpoints used by the collection pipeline, and the outbound request
//! policy (shared rate limiting and retries).
//!
//! ## Architecture
//!
//! ```text
//! Collection pipeline (catalog walker, metadata batcher)
//!          ↓
//!     WebApi trait
//!          ↓
//! SpotifyClient ── Limiter (governor) ── RetryPolicy
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - Authorization URL, loopback callback capture and the
//!   code-for-token exchange
//! - [`client`] - [`SpotifyClient`], the reqwest-backed [`WebApi`]
//!   implementation with pagination
//! - [`limiter`] - A direct rate limiter shared by every outbound call
//! - [`retry`] - Backoff policy for 429 and transient 5xx responses
//!
//! ## API Coverage
//!
//! - `POST /api/token` - Authorization code exchange
//! - `GET /browse/categories/{id}/playlists` - Playlists of a category
//! - `GET /me/playlists` - Playlists of the current user
//! - `GET /playlists/{id}/tracks` - Track listing of a playlist
//! - `GET /tracks` - Track attributes for up to 50 ids
//! - `GET /audio-features` - Audio features for up to 100 ids
//!
//! ## Error Handling
//!
//! Non-2xx responses surface as [`crate::Error::Http`] carrying status and
//! body, after the retry policy has given up on transient statuses.

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{AudioFeatures, PlaylistItem, Track},
};

pub mod auth;
pub mod client;
pub mod limiter;
pub mod retry;

pub use client::SpotifyClient;
pub use limiter::{Limiter, RateLimit};
pub use retry::RetryPolicy;

/// The catalog and metadata endpoints the collection pipeline depends on.
///
/// [`SpotifyClient`] talks to the real provider; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait WebApi: Send + Sync {
    /// Up to `limit` playlists of a category, as available in `country`.
    /// Items are `None` when the provider returns `null` entries.
    async fn category_playlists(
        &self,
        category_id: &str,
        country: &str,
        limit: usize,
    ) -> Result<Vec<Option<PlaylistItem>>>;

    /// Every playlist owned or followed by the current user.
    async fn user_playlists(&self) -> Result<Vec<Option<PlaylistItem>>>;

    /// The track ids of a playlist in listing order. Removed or unavailable
    /// tracks are `None`.
    async fn playlist_track_ids(
        &self,
        playlist_id: &str,
        market: Option<&str>,
    ) -> Result<Vec<Option<String>>>;

    /// Track attributes, positionally aligned with `ids`.
    async fn several_tracks(&self, ids: &[String]) -> Result<Vec<Option<Track>>>;

    /// Audio features, positionally aligned with `ids`.
    async fn several_audio_features(&self, ids: &[String]) -> Result<Vec<Option<AudioFeatures>>>;
}
