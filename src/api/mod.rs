//! # API Module
//!
//! HTTP endpoints of the short-lived local server that receives the OAuth
//! redirect during `songset` authorization.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the provider's redirect, checks the `state`
//!   value and hands the authorization code to the waiting flow.
//! - [`health`] - Reports status and version.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use songset::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
