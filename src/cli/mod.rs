//! # CLI Module
//!
//! User-facing commands of songset. Each command resolves its inputs, drives
//! the library components and reports progress with spinners, progress bars
//! and tables. Failures that end a command are reported through the
//! [`crate::error!`] macro, which exits the process.
//!
//! ## Commands
//!
//! - [`auth_url`] - Print the provider authorization URL
//! - [`liked`] - Collect the user's own playlists into the liked dataset
//! - [`unheard`] - Collect category playlists into the unheard dataset
//! - [`convert`] - Convert a directory of CSV files to Parquet
//! - [`inspect`] - Summarize a dataset file per category
//!
//! ## Usage
//!
//! ```bash
//! songset auth-url
//! songset liked --code <CODE>
//! songset unheard --category pop=0JQ5DAqbMKFEC4WFtoNRpw --limit 3
//! songset convert datasets/dirty/store-sales-time datasets/cleaned/store-sales-time
//! songset inspect datasets/cleaned/music-recommendation-system/unheard/categories.parquet
//! ```

mod auth;
mod collect;
mod convert;
mod inspect;

pub use auth::{auth_url, bearer_token};
pub use collect::{CollectOptions, liked, unheard};
pub use convert::convert;
pub use inspect::inspect;
