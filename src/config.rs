//! Configuration management for songset.
//!
//! Secrets and endpoints are read from the environment exactly once, at
//! process start, into a [`Settings`] value that is passed explicitly to the
//! token provider and the API client. Values are looked up in this order:
//! 1. Process environment variables (highest priority)
//! 2. `.env.local`, then `.env`, in the working directory
//! 3. `.env` in the local data directory (`songset/.env`)
//! 4. Built-in defaults for everything except the client credentials

use std::{env, path::PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SCOPE: &str = "user-read-private user-read-email playlist-read-private";

/// Loads environment files into the process environment.
///
/// Every file is optional. `dotenv` never overrides variables that are
/// already set, so the first file that defines a key wins.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be created or if an
/// existing environment file cannot be parsed.
///
/// # Example
///
/// ```
/// use songset::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<()> {
    for file in [".env.local", ".env"] {
        load_file(PathBuf::from(file))?;
    }

    let path = data_env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }
    load_file(path)
}

fn load_file(path: PathBuf) -> Result<()> {
    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path)
        .map(|_| ())
        .map_err(|e| Error::Config(format!("cannot load {}: {}", path.display(), e)))
}

/// Location of the per-user environment file.
pub fn data_env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("songset/.env");
    path
}

/// Credentials and endpoints of the music provider.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub scope: String,
}

impl Settings {
    /// Reads the settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `CLIENT_ID` or `CLIENT_SECRET` is unset
    /// or empty.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            redirect_uri: optional("REDIRECT_URI", DEFAULT_REDIRECT_URI),
            auth_url: optional("SPOTIFY_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: optional("SPOTIFY_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: optional("SPOTIFY_API_URL", DEFAULT_API_URL),
            scope: optional("SPOTIFY_SCOPE", DEFAULT_SCOPE),
        })
    }

    /// Settings with the provider's public endpoints and the given credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

fn required(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{} must be set", key))),
    }
}

fn optional(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
