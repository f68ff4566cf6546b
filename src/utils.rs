use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, distr::Alphanumeric};
use reqwest::Url;

use crate::{
    error::{Error, Result},
    types::Category,
};

/// Category names and ids collected when no `--category` is given.
pub const DEFAULT_CATEGORIES: [(&str, &str); 7] = [
    ("pop", "0JQ5DAqbMKFEC4WFtoNRpw"),
    ("mood", "0JQ5DAqbMKFzHmL4tf05da"),
    ("dance/electronic", "0JQ5DAqbMKFHOzuVTgTizF"),
    ("r&b", "0JQ5DAqbMKFEZPnFQSFB1T"),
    ("dance", "0JQ5DAqbMKFA6SOHvT3gck"),
    ("jazz", "0JQ5DAqbMKFAJ5xb0fwo9m"),
    ("classical", "0JQ5DAqbMKFPrEiAOxgac3"),
];

pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, id)| Category::new(*name, *id))
        .collect()
}

/// Random value for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Parses a `name=id` pair as given on the command line.
pub fn parse_category(s: &str) -> std::result::Result<Category, String> {
    let (name, id) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=ID, got '{}'", s))?;

    let (name, id) = (name.trim(), id.trim());
    if name.is_empty() || id.is_empty() {
        return Err(format!("expected NAME=ID, got '{}'", s));
    }

    Ok(Category::new(name, id))
}

/// Splits a redirect URI into the address to bind and the callback path.
pub fn callback_target(redirect_uri: &str) -> Result<(String, String)> {
    let url = Url::parse(redirect_uri)
        .map_err(|e| Error::Config(format!("invalid redirect uri {}: {}", redirect_uri, e)))?;

    let host = url
        .host_str()
        .ok_or_else(|| Error::Config(format!("redirect uri {} has no host", redirect_uri)))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| Error::Config(format!("redirect uri {} has no port", redirect_uri)))?;

    let path = url.path().to_string();
    if path == "/health" {
        return Err(Error::Config(
            "redirect uri path /health is reserved".to_string(),
        ));
    }

    Ok((format!("{}:{}", host, port), path))
}

/// True if the path has a `csv` extension, ignoring case.
pub fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Output path in `dest_dir` for a source file: same stem, `.parquet` extension.
pub fn parquet_destination(source: &Path, dest_dir: &Path) -> Option<PathBuf> {
    let stem = source.file_stem()?;
    let mut name = stem.to_os_string();
    name.push(".parquet");
    Some(dest_dir.join(name))
}

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

pub fn progress_bar(len: u64, message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_message(message.into());
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.blue} [{bar:30.blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏").progress_chars("=> "));
    }
    pb
}
