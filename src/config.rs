//! Feed-reader connection settings.
//!
//! Values come from the `MINIFLUX_URL` / `MINIFLUX_API_KEY` environment
//! variables, falling back to an optional TOML file at
//! `~/.config/ghfeeds/config.toml`. Environment variables win. Both values
//! are required before any network call; the error names whichever is
//! missing.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("{0} is not set (environment variable or config file)")]
    Missing(&'static str),
}

/// Optional on-disk settings. Any subset of keys may be present; missing
/// keys fall back to the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    url: Option<String>,
    api_key: Option<String>,
}

impl FileConfig {
    /// Maximum config file size; the file holds two short strings, so
    /// anything larger is a mistake.
    const MAX_FILE_SIZE: u64 = 65_536;

    /// Load the optional config file.
    ///
    /// - Missing file → `Ok(FileConfig::default())`
    /// - Empty file → `Ok(FileConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as a warning
    fn read(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using environment only");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race: file deleted between metadata and read
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["url", "api_key"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: FileConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

/// Resolved connection settings for the feed reader.
pub struct Config {
    /// Base URL of the reader API, e.g. `https://reader.example.com`.
    pub url: String,
    /// API token, sent as `X-Auth-Token` on every request.
    pub api_key: SecretString,
}

/// Masks the API key so it never lands in logs or error output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Default config file location (`~/.config/ghfeeds/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("ghfeeds")
                .join("config.toml")
        })
    }

    /// Resolve settings from the process environment plus an optional
    /// config file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => FileConfig::read(p)?,
            None => FileConfig::default(),
        };
        Self::from_sources(
            std::env::var("MINIFLUX_URL").ok(),
            std::env::var("MINIFLUX_API_KEY").ok(),
            file,
        )
    }

    fn from_sources(
        env_url: Option<String>,
        env_key: Option<String>,
        file: FileConfig,
    ) -> Result<Self, ConfigError> {
        let url = env_url
            .filter(|v| !v.is_empty())
            .or(file.url)
            .ok_or(ConfigError::Missing("MINIFLUX_URL"))?;
        let api_key = env_key
            .filter(|v| !v.is_empty())
            .or(file.api_key)
            .ok_or(ConfigError::Missing("MINIFLUX_API_KEY"))?;

        Ok(Self {
            url,
            api_key: SecretString::from(api_key),
        })
    }
}
