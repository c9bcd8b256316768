//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default good-enough threshold for fetched text, in characters
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 500;

const MIB: usize = 1024 * 1024;

/// Configuration for extraction and link fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fetched text must be longer than this (in characters) to stop escalation
    pub min_text_length: usize,

    /// Static tier request timeout in seconds
    pub static_timeout_secs: u64,

    /// Evasive tier request timeout in seconds
    pub evasive_timeout_secs: u64,

    /// Dynamic tier hard navigation timeout in seconds
    pub navigation_timeout_secs: u64,

    /// Extra wait after page load for client-side rendering, in milliseconds
    pub settle_delay_ms: u64,

    /// User agent for the Static tier
    pub user_agent: String,

    /// Largest artifact or response body accepted, in bytes
    pub max_input_bytes: usize,

    /// Archive enumeration stops after this many members
    pub max_archive_members: usize,

    /// Archive members larger than this are skipped, in bytes
    pub max_member_bytes: usize,

    /// Parent directory for scratch directories; system temp dir when unset
    pub scratch_dir: Option<PathBuf>,

    /// Case-insensitive markers of anti-bot challenge pages
    pub challenge_markers: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
            static_timeout_secs: 10,
            evasive_timeout_secs: 20,
            navigation_timeout_secs: 60,
            settle_delay_ms: 10_000,
            user_agent: format!("textmill/{}", env!("CARGO_PKG_VERSION")),
            max_input_bytes: 50 * MIB,
            max_archive_members: 1000,
            max_member_bytes: 50 * MIB,
            scratch_dir: None,
            challenge_markers: vec![
                "Please enable JavaScript".to_string(),
                "Checking your browser".to_string(),
                "Enable JavaScript and cookies to continue".to_string(),
                "cf-browser-verification".to_string(),
                "Just a moment...".to_string(),
            ],
        }
    }
}

/// Failure to load a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl PipelineConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Set the good-enough threshold
    pub fn with_min_text_length(mut self, chars: usize) -> Self {
        self.min_text_length = chars;
        self
    }

    /// Set the Static and Evasive tier timeouts
    pub fn with_http_timeouts(mut self, static_secs: u64, evasive_secs: u64) -> Self {
        self.static_timeout_secs = static_secs;
        self.evasive_timeout_secs = evasive_secs;
        self
    }

    /// Set the Dynamic tier navigation timeout
    pub fn with_navigation_timeout(mut self, secs: u64) -> Self {
        self.navigation_timeout_secs = secs;
        self
    }

    /// Set the Dynamic tier settle delay
    pub fn with_settle_delay(mut self, millis: u64) -> Self {
        self.settle_delay_ms = millis;
        self
    }

    /// Set the maximum accepted input size
    pub fn with_max_input_bytes(mut self, bytes: usize) -> Self {
        self.max_input_bytes = bytes;
        self
    }

    /// Set archive walking limits
    pub fn with_archive_limits(mut self, max_members: usize, max_member_bytes: usize) -> Self {
        self.max_archive_members = max_members;
        self.max_member_bytes = max_member_bytes;
        self
    }

    /// Place scratch directories under `dir`
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn static_timeout(&self) -> Duration {
        Duration::from_secs(self.static_timeout_secs)
    }

    pub fn evasive_timeout(&self) -> Duration {
        Duration::from_secs(self.evasive_timeout_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
