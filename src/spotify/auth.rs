use std::{sync::Arc, time::Duration};

use reqwest::{Client, Url};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    config::Settings,
    error::{Error, Result},
    info,
    server::start_api_server,
    types::{AuthCallback, TokenResponse},
    utils, warning,
};

/// How long the interactive flow waits for the provider to call back.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Builds the URL the user visits to grant access.
///
/// The URL requests an authorization code (`response_type=code`) for the
/// configured client, redirect URI and scope. `state` is echoed back by the
/// provider and checked by the callback handler.
///
/// # Errors
///
/// Returns [`Error::Config`] if the configured authorization endpoint is not
/// a valid URL.
///
/// # Example
///
/// ```
/// let settings = Settings::new("client-id", "client-secret");
/// let url = authorization_url(&settings, "xyz")?;
/// assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
/// ```
pub fn authorization_url(settings: &Settings, state: &str) -> Result<String> {
    let url = Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("scope", settings.scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| Error::Config(format!("invalid authorization url: {}", e)))?;

    Ok(url.to_string())
}

/// Exchanges an authorization code for a bearer token.
///
/// Sends a single form-encoded POST to the token endpoint carrying the code,
/// the redirect URI it was issued for, and the client credentials. There is
/// no retry: authorization codes are single-use.
///
/// # Errors
///
/// - [`Error::AuthExchange`] if the provider answers with a non-success
///   status (status and body are preserved) or the response carries no
///   access token
/// - [`Error::Request`] on network failures
pub async fn exchange_code(settings: &Settings, code: &str) -> Result<String> {
    let client = Client::new();
    let response = client
        .post(&settings.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("client_id", settings.client_id.as_str()),
            ("client_secret", settings.client_secret.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::AuthExchange {
            status: status.as_u16(),
            body,
        });
    }

    let token: TokenResponse = response.json().await?;
    token
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::AuthExchange {
            status: status.as_u16(),
            body: "token response carried no access_token".to_string(),
        })
}

/// Runs the interactive authorization flow and returns the authorization code.
///
/// 1. Generates a random `state` value
/// 2. Binds a local callback server on the redirect URI's host and port
/// 3. Opens the authorization URL in the browser (or prints it)
/// 4. Waits for the provider to redirect back with a code
///
/// # Errors
///
/// - [`Error::Config`] if the redirect URI is not a loopback-style URL with
///   a host
/// - [`Error::Io`] if the callback address cannot be bound
/// - [`Error::Authorization`] if the user denies access or nothing arrives
///   within [`CALLBACK_TIMEOUT`]
pub async fn authorize(settings: &Settings) -> Result<String> {
    let state = utils::generate_state();
    let auth_url = authorization_url(settings, &state)?;

    let (addr, callback_path) = utils::callback_target(&settings.redirect_uri)?;
    let listener = TcpListener::bind(&addr).await?;

    let shared_state = Arc::new(Mutex::new(AuthCallback {
        state,
        ..AuthCallback::default()
    }));

    let server_state = Arc::clone(&shared_state);
    let server = tokio::spawn(async move {
        start_api_server(listener, &callback_path, server_state).await;
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    } else {
        info!("Waiting for authorization in the browser...");
    }

    let outcome = wait_for_code(shared_state, CALLBACK_TIMEOUT).await;
    server.abort();
    outcome
}

/// Polls the shared callback state until a code or an error arrives.
///
/// # Errors
///
/// Returns [`Error::Authorization`] when the provider reported an error or
/// `max_wait` elapsed.
pub async fn wait_for_code(
    shared_state: Arc<Mutex<AuthCallback>>,
    max_wait: Duration,
) -> Result<String> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < max_wait {
        {
            let lock = shared_state.lock().await;
            if let Some(error) = &lock.error {
                return Err(Error::Authorization(error.clone()));
            }
            if let Some(code) = &lock.code {
                return Ok(code.clone());
            }
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    Err(Error::Authorization(
        "timed out waiting for the authorization callback".to_string(),
    ))
}
