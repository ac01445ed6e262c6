//! TOML configuration for the `globe` CLI.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration. Command-line flags are applied on top by the
//! binary.
//!
//! ```toml
//! [sources]
//! dataset = "https://reports.example.org/field_reports_aggregated.json"
//! token_url = "https://reports.example.org/api/get-token"
//! fetch_timeout_secs = 10
//!
//! [playback]
//! tick_interval_ms = 400
//!
//! [view]
//! zoom = 3.0
//! ```

use std::path::Path;
use std::time::Duration;

use globe_dataset::{DEFAULT_DATASET, DatasetSource};
use globe_playback::{PlaybackConfig, PlaybackConfigError, ViewOptions};
use serde::{Deserialize, Serialize};

/// Environment variable the credential is read from when no token URL is
/// configured.
pub const DEFAULT_TOKEN_ENV: &str = "MAPBOX_TOKEN";

/// Errors that can occur while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML or does not match the schema.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value parsed but is unusable.
    #[error("invalid configuration: {message}")]
    Invalid {
        /// What is wrong.
        message: String,
    },
}

impl From<PlaybackConfigError> for ConfigError {
    fn from(e: PlaybackConfigError) -> Self {
        Self::Invalid {
            message: e.to_string(),
        }
    }
}

/// Where the credential and the dataset come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Dataset path or `http(s)://` URL.
    pub dataset: String,
    /// Credential endpoint. When unset the token is read from `token_env`.
    pub token_url: Option<String>,
    /// Environment variable holding the token when `token_url` is unset.
    pub token_env: String,
    /// Timeout for the credential and dataset requests.
    pub fetch_timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            dataset: DEFAULT_DATASET.to_string(),
            token_url: None,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            fetch_timeout_secs: 30,
        }
    }
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `[sources]`
    pub sources: SourcesConfig,
    /// `[playback]`
    pub playback: PlaybackConfig,
    /// `[view]`
    pub view: ViewOptions,
}

impl AppConfig {
    /// Reads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid
    /// TOML, or holds an unusable value.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Reading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.playback.validate()?;

        if self.sources.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "sources.fetch_timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.sources.dataset.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "sources.dataset must not be empty".to_string(),
            });
        }
        if self.sources.token_url.is_none() && self.sources.token_env.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "either sources.token_url or sources.token_env must be set".to_string(),
            });
        }
        if !(self.view.zoom.is_finite() && self.view.center.lng.is_finite()) {
            return Err(ConfigError::Invalid {
                message: "view.zoom and view.center must be finite".to_string(),
            });
        }
        Ok(())
    }

    /// Timeout applied to each startup request.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.fetch_timeout_secs)
    }

    /// Parsed dataset location.
    #[must_use]
    pub fn dataset_source(&self) -> DatasetSource {
        let Ok(source) = self.sources.dataset.parse::<DatasetSource>();
        source
    }
}
