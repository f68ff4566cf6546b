use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::types::AuthCallback;

pub async fn health(Extension(shared_state): Extension<Arc<Mutex<AuthCallback>>>) -> Json<Value> {
    let pending = shared_state.lock().await;
    Json(json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "code_received": pending.code.is_some(),
    }))
}
