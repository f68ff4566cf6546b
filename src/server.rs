use axum::{Extension, Router, routing::get};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

use crate::{api, types::AuthCallback, warning};

/// Builds the router of the local callback server.
///
/// The callback handler is mounted at `callback_path`, the path component of
/// the configured redirect URI.
pub fn router(callback_path: &str, state: Arc<Mutex<AuthCallback>>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(callback_path, get(api::callback))
        .layer(Extension(state))
}

pub async fn start_api_server(
    listener: TcpListener,
    callback_path: &str,
    state: Arc<Mutex<AuthCallback>>,
) {
    let app = router(callback_path, state);

    if let Err(e) = axum::serve(listener, app).await {
        warning!("Callback server stopped: {}", e);
    }
}
