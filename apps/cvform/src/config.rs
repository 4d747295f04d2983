use std::path::PathBuf;

use anyhow::{bail, Result};

/// Application configuration loaded from environment variables (and `.env` if present).
/// Every variable has a default, so an empty environment is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the draft slot files.
    pub draft_dir: PathBuf,
    /// Directory the rendered document is written to.
    pub output_dir: PathBuf,
    /// JSON form snapshot to import at startup.
    pub input: Option<PathBuf>,
    /// JPEG/PNG to attach as the profile photo.
    pub photo: Option<PathBuf>,
    pub consent: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        Ok(Config {
            draft_dir: path("CVFORM_DRAFT_DIR").unwrap_or_else(|| PathBuf::from(".cvform")),
            output_dir: path("CVFORM_OUTPUT_DIR").unwrap_or_else(|| PathBuf::from(".")),
            input: path("CVFORM_INPUT"),
            photo: path("CVFORM_PHOTO"),
            consent: parse_flag("CVFORM_CONSENT", lookup("CVFORM_CONSENT"))?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_flag(key: &str, raw: Option<String>) -> Result<bool> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be a boolean, got '{other}'"),
    }
}
