//! Configuration file parser for ~/.config/tidefeed/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are usually typos.
use crate::feed::{FeedSettings, SentinelOptions};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Posts promoted per page.
    pub page_size: usize,

    /// Artificial delay before the first page appears, in milliseconds.
    pub initial_delay_ms: u64,

    /// How far ahead of the viewport the end-of-feed sentinel starts triggering,
    /// in logical pixels.
    pub sentinel_margin: u32,

    /// Fraction of the sentinel that must be in range to trigger (0.0–1.0].
    pub sentinel_threshold: f32,

    /// JSON posts file used instead of the bundled sample feed.
    pub posts_file: Option<PathBuf>,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let sentinel = SentinelOptions::default();
        Self {
            page_size: crate::feed::DEFAULT_PAGE_SIZE,
            initial_delay_ms: crate::feed::DEFAULT_INITIAL_DELAY.as_millis() as u64,
            sentinel_margin: sentinel.root_margin,
            sentinel_threshold: sentinel.threshold,
            posts_file: None,
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "page_size",
        "initial_delay_ms",
        "sentinel_margin",
        "sentinel_threshold",
        "posts_file",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Out-of-range values → `Err(ConfigError::Invalid)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse TOML text into a validated config.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        tracing::info!(
            page_size = config.page_size,
            initial_delay_ms = config.initial_delay_ms,
            "Loaded configuration"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.sentinel_threshold > 0.0 && self.sentinel_threshold <= 1.0) {
            return Err(ConfigError::Invalid {
                key: "sentinel_threshold",
                reason: format!("{} is not in (0.0, 1.0]", self.sentinel_threshold),
            });
        }
        Ok(())
    }

    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            page_size: self.page_size,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
        }
    }

    pub fn sentinel_options(&self) -> SentinelOptions {
        SentinelOptions {
            root_margin: self.sentinel_margin,
            threshold: self.sentinel_threshold,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
