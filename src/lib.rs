//! Song metadata collection and CSV to Parquet conversion.
//!
//! This library collects track metadata from the Spotify Web API and writes
//! it to Parquet datasets, and converts directories of CSV files to Parquet.
//! The collection pipeline runs once per invocation:
//!
//! ```text
//! token exchange -> catalog walk -> metadata batches -> dataset sink
//! ```
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local OAuth callback server
//! - `catalog` - Category and playlist walking, track id collection
//! - `cli` - Command-line interface implementations
//! - `config` - Environment loading and provider settings
//! - `convert` - CSV to Parquet conversion over a directory
//! - `dataset` - In-memory dataset and its Parquet sink
//! - `error` - Error taxonomy shared by all components
//! - `metadata` - Batched track and audio-feature lookups
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client, token provider and rate limiting
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use songset::{config, convert};
//!
//! #[tokio::main]
//! async fn main() -> songset::Result<()> {
//!     config::load_env().await?;
//!     convert::convert_all("datasets/dirty", "datasets/cleaned", Default::default())?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod convert;
pub mod dataset;
pub mod error;
pub mod metadata;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{Error, Result};

/// Prints an informational line prefixed with a blue `o`.
///
/// Accepts the same arguments as `println!`.
///
/// ```
/// info!("Found {} playlists in {} categories", playlists, categories);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a completion line prefixed with a green check mark.
///
/// ```
/// success!("Wrote {} rows to {}", rows, path.display());
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line and exits the process with status 1.
///
/// Only for failures that end a command. The expansion diverges, so it can
/// stand in any expression position, such as a `match` arm yielding a value.
///
/// ```
/// let dataset = match Dataset::read(path) {
///     Ok(d) => d,
///     Err(e) => error!("Cannot read dataset. Err: {}", e),
/// };
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow `!` line for a recoverable problem.
///
/// ```
/// warning!("Skipping category {}: {}", name, err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
