//! Error taxonomy shared by every component of the crate.
//!
//! Collection runs distinguish between failures that only drop part of the
//! result (a single category or playlist) and failures that abort the run
//! (batch alignment, metadata lookups, writes). The variants below carry
//! enough context to report either kind to the user.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the token provider, the collection pipeline, the
/// dataset sink and the format converter.
#[derive(Debug, Error)]
pub enum Error {
    /// The token endpoint refused the authorization code.
    #[error("authorization code exchange failed with status {status}: {body}")]
    AuthExchange { status: u16, body: String },

    /// The interactive authorization flow did not yield a code.
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// A catalog, track or audio-feature call returned a non-2xx status.
    #[error("request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    /// The paired lookups of one batch cannot be merged position by position.
    #[error(
        "batch {batch} is misaligned: requested {requested} ids, got {tracks} tracks and {features} audio features"
    )]
    BatchAlignment {
        batch: usize,
        requested: usize,
        tracks: usize,
        features: usize,
    },

    /// Track and audio-feature entries at the same position describe different tracks.
    #[error("batch {batch} pairs track {track_id} with audio features of {feature_id}")]
    MismatchedPair {
        batch: usize,
        track_id: String,
        feature_id: String,
    },

    /// A columnar file could not be written.
    #[error("cannot write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    /// A delimited or columnar input file could not be read.
    #[error("cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Required configuration is missing from the environment.
    #[error("configuration error: {0}")]
    Config(String),

    /// A run was configured with values outside of the accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Write {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Returns true for errors that abort a whole collection run.
    pub fn is_alignment(&self) -> bool {
        matches!(
            self,
            Error::BatchAlignment { .. } | Error::MismatchedPair { .. }
        )
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;
