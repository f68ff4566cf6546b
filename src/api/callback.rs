use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{types::AuthCallback, warning};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<AuthCallback>>>,
) -> Html<&'static str> {
    let mut pending = shared_state.lock().await;

    if let Some(error) = params.get("error") {
        pending.error = Some(error.clone());
        return Html("<h4>Authorization denied.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    // A stray request must not end the flow, only a matching one counts.
    if params.get("state") != Some(&pending.state) {
        warning!("Ignoring authorization callback with unexpected state.");
        return Html("<h4>Authorization state mismatch.</h4>");
    }

    pending.code = Some(code.clone());
    Html("<h2>Authorization successful.</h2><p>Close browser window.</p>")
}
