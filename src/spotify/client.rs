use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    error::{Error, Result},
    spotify::{
        WebApi,
        limiter::Limiter,
        retry::{self, RetryPolicy},
    },
    types::{
        AudioFeatures, CategoryPlaylistsResponse, Page, PlaylistItem, PlaylistTrackItem,
        SeveralAudioFeaturesResponse, SeveralTracksResponse, Track,
    },
    warning,
};

/// Largest page the browse and playlist listing endpoints accept.
const PAGE_LIMIT: usize = 50;

/// Largest page the playlist tracks endpoint accepts.
const TRACKS_PAGE_LIMIT: usize = 100;

/// Authenticated client for the Spotify Web API.
///
/// Every request waits on the shared [`Limiter`] before it is sent and is
/// retried according to the [`RetryPolicy`] on transient failures.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token: String,
    limiter: Limiter,
    retry: RetryPolicy,
}

impl SpotifyClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            limiter: Limiter::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_limiter(mut self, limiter: Limiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let raw = format!("{}/{}", self.api_url, path.trim_start_matches('/'));
        Url::parse_with_params(&raw, params)
            .map_err(|e| Error::InvalidConfig(format!("invalid API url {}: {}", raw, e)))
    }

    /// Sends an authenticated GET and decodes the JSON body.
    ///
    /// Retries 429, 500, 502, 503 and 504 responses as well as connect and
    /// timeout failures while the retry policy allows it. Any other non-2xx
    /// status becomes [`Error::Http`].
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> Result<T> {
        let mut attempt = 0;

        loop {
            self.limiter.acquire().await;
            let response = self
                .http
                .get(url.clone())
                .bearer_auth(&self.token)
                .send()
                .await;

            let response = match response {
                Ok(resp) => resp,
                Err(err) if err.is_connect() || err.is_timeout() => {
                    match self.retry.delay_for_transport(attempt) {
                        Some(delay) => {
                            warning!(
                                "Request to {} failed ({}), retrying in {} ms",
                                url.path(),
                                err,
                                delay.as_millis()
                            );
                            sleep(delay).await;
                            attempt += 1;
                            continue;
                        }
                        None => return Err(err.into()),
                    }
                }
                Err(err) => return Err(err.into()),
            };

            let status = response.status();
            if status.is_success() {
                return Ok(response.json::<T>().await?);
            }

            let retry_after = retry::retry_after(response.headers());
            match self.retry.delay_for(status, retry_after, attempt) {
                Some(delay) => {
                    warning!(
                        "{} answered {}, retrying in {} ms",
                        url.path(),
                        status,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    if let Some(wait) = retry_after.filter(|w| *w > self.retry.max_retry_after) {
                        warning!(
                            "Retry-After has reached an abnormal high of {} seconds, giving up.",
                            wait.as_secs()
                        );
                    }
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Http {
                        status: status.as_u16(),
                        body,
                    });
                }
            }
        }
    }

    /// Follows `next` links starting at `first`, collecting at most
    /// `max_items` entries (all entries when `None`).
    async fn collect_pages<R, T, F>(
        &self,
        first: Url,
        max_items: Option<usize>,
        page_of: F,
    ) -> Result<Vec<Option<T>>>
    where
        R: DeserializeOwned + Send,
        T: Send,
        F: Fn(R) -> Page<T> + Send + Sync,
    {
        let mut items = Vec::new();
        let mut next = Some(first);

        while let Some(url) = next.take() {
            let page = page_of(self.get_json::<R>(&url).await?);
            items.extend(page.items);

            if max_items.is_some_and(|max| items.len() >= max) {
                break;
            }

            next = match page.next.as_deref().map(Url::parse) {
                Some(Ok(link)) => (link != url).then_some(link),
                Some(Err(e)) => {
                    warning!("Ignoring malformed next link after {}: {}", url.path(), e);
                    None
                }
                None => None,
            };
        }

        if let Some(max) = max_items {
            items.truncate(max);
        }
        Ok(items)
    }
}

#[async_trait]
impl WebApi for SpotifyClient {
    async fn category_playlists(
        &self,
        category_id: &str,
        country: &str,
        limit: usize,
    ) -> Result<Vec<Option<PlaylistItem>>> {
        let url = self.endpoint(
            &format!("browse/categories/{}/playlists", category_id),
            &[
                ("country", country.to_string()),
                ("limit", limit.clamp(1, PAGE_LIMIT).to_string()),
            ],
        )?;

        self.collect_pages(url, Some(limit), |r: CategoryPlaylistsResponse| {
            r.playlists
        })
        .await
    }

    async fn user_playlists(&self) -> Result<Vec<Option<PlaylistItem>>> {
        let url = self.endpoint("me/playlists", &[("limit", PAGE_LIMIT.to_string())])?;
        self.collect_pages(url, None, |p: Page<PlaylistItem>| p).await
    }

    async fn playlist_track_ids(
        &self,
        playlist_id: &str,
        market: Option<&str>,
    ) -> Result<Vec<Option<String>>> {
        let mut params = vec![
            ("fields", "items(track(id)),next,total".to_string()),
            ("limit", TRACKS_PAGE_LIMIT.to_string()),
        ];
        if let Some(market) = market {
            params.push(("market", market.to_string()));
        }
        let url = self.endpoint(&format!("playlists/{}/tracks", playlist_id), &params)?;

        let items = self
            .collect_pages(url, None, |p: Page<PlaylistTrackItem>| p)
            .await?;

        Ok(items
            .into_iter()
            .map(|item| item.and_then(|i| i.track).and_then(|t| t.id))
            .collect())
    }

    async fn several_tracks(&self, ids: &[String]) -> Result<Vec<Option<Track>>> {
        let url = self.endpoint("tracks", &[("ids", ids.join(","))])?;
        let response = self.get_json::<SeveralTracksResponse>(&url).await?;
        Ok(response.tracks)
    }

    async fn several_audio_features(&self, ids: &[String]) -> Result<Vec<Option<AudioFeatures>>> {
        let url = self.endpoint("audio-features", &[("ids", ids.join(","))])?;
        let response = self.get_json::<SeveralAudioFeaturesResponse>(&url).await?;
        Ok(response.audio_features)
    }
}
