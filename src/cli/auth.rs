use crate::{
    config::Settings,
    error, info,
    spotify::auth,
    success, utils,
};

pub fn auth_url(settings: &Settings) {
    match auth::authorization_url(settings, &utils::generate_state()) {
        Ok(url) => {
            info!("Open this URL in your browser and copy the code parameter of the redirect:");
            println!("{}", url);
        }
        Err(e) => error!("Cannot build authorization url. Err: {}", e),
    }
}

/// Turns a pasted authorization code, or the interactive flow when no code
/// is given, into a bearer token. Exits on failure.
pub async fn bearer_token(settings: &Settings, code: Option<String>) -> String {
    let code = match code {
        Some(code) => code,
        None => match auth::authorize(settings).await {
            Ok(code) => code,
            Err(e) => error!("Authorization failed. Err: {}", e),
        },
    };

    let pb = utils::spinner("Exchanging authorization code...");
    let token = auth::exchange_code(settings, &code).await;
    pb.finish_and_clear();

    match token {
        Ok(token) => {
            success!("Authorized");
            token
        }
        Err(e) => error!("Token exchange failed. Err: {}", e),
    }
}
