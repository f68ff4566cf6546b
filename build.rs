//! Build script for songset.
//!
//! Copies the `.env.example` template into the local data directory, next to
//! the `.env` file the binary reads at start-up.

use std::{env, fs, path::PathBuf};

/// Copies `.env.example` from the crate root to `<data_local_dir>/songset/`.
///
/// - Linux: `~/.local/share/songset/.env.example`
/// - macOS: `~/Library/Application Support/songset/.env.example`
/// - Windows: `%LOCALAPPDATA%/songset/.env.example`
///
/// A missing template only emits a cargo warning. Directory or write
/// failures fail the build.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("songset");
    fs::create_dir_all(&out_dir)?;

    if env_example_path.is_file() {
        let contents = fs::read_to_string(&env_example_path)?;
        fs::write(out_dir.join(".env.example"), contents)?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
    }

    Ok(())
}
