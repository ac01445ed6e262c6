#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset loader for the aggregated field report file.
//!
//! The dataset is loaded exactly once at startup, either from a local path
//! or over HTTP from the same origin that serves the front-end. Parsing and
//! validation happen together so a malformed or empty file fails fast with
//! a descriptive [`DatasetError`] instead of surfacing later during playback.

pub mod http;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use globe_dataset_models::{Dataset, DatasetValidationError, MonthRecord};

/// File name the aggregation pipeline writes and the server publishes.
pub const DEFAULT_DATASET: &str = "field_reports_aggregated.json";

/// Errors that can occur while loading the dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete in time.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// The server answered with a non-success status.
    #[error("request to {url} failed with HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Status code returned.
        status: reqwest::StatusCode,
    },

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file parsed but violates a dataset invariant.
    #[error("invalid dataset: {0}")]
    Invalid(#[from] DatasetValidationError),
}

impl DatasetError {
    /// `true` when the failure happened while transferring the dataset
    /// rather than while interpreting it.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout { .. } | Self::Status { .. } | Self::Io(_)
        )
    }
}

/// Where the dataset is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// A file on the local filesystem.
    File(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
}

impl DatasetSource {
    /// Loads and validates the dataset.
    ///
    /// `timeout` only applies to URL sources.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the dataset cannot be read, times out,
    /// is not valid JSON, or fails validation.
    pub async fn load(
        &self,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Result<Dataset, DatasetError> {
        let dataset = match self {
            Self::File(path) => load_file(path).await?,
            Self::Url(url) => fetch(client, url, timeout).await?,
        };

        log::info!(
            "Loaded {} months of aggregated data from {self} ({} total reports)",
            dataset.len(),
            dataset.total_reports(),
        );

        Ok(dataset)
    }
}

impl Default for DatasetSource {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_DATASET))
    }
}

impl FromStr for DatasetSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Ok(Self::Url(trimmed.to_string()))
        } else {
            Ok(Self::File(PathBuf::from(trimmed)))
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Parses and validates dataset JSON.
///
/// # Errors
///
/// Returns [`DatasetError::Json`] for malformed JSON and
/// [`DatasetError::Invalid`] when the months violate a dataset invariant.
pub fn parse_dataset(text: &str) -> Result<Dataset, DatasetError> {
    let months: Vec<MonthRecord> = serde_json::from_str(text)?;
    Ok(Dataset::new(months)?)
}

/// Reads the dataset from a local file.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read or parsed.
pub async fn load_file(path: &Path) -> Result<Dataset, DatasetError> {
    log::debug!("Reading dataset from {}", path.display());
    let text = tokio::fs::read_to_string(path).await?;
    parse_dataset(&text)
}

/// Fetches the dataset over HTTP.
///
/// # Errors
///
/// Returns [`DatasetError`] if the request fails, times out, returns a
/// non-success status, or the body cannot be parsed.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Dataset, DatasetError> {
    log::debug!("Fetching dataset from {url}");
    let text = http::get_text(client, url, timeout).await?;
    parse_dataset(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_MONTH: &str = r#"[
        {"month": "2019-05", "date": "2019-05-01", "total_reports": 3, "total_locations": 1,
         "locations": [{"lat": 12.0, "lon": 45.0, "count": 3, "dtype_name": "Drought"}]}
    ]"#;

    #[test]
    fn parses_valid_dataset() {
        let dataset = parse_dataset(ONE_MONTH).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.first().month, "2019-05");
    }

    #[test]
    fn distinguishes_json_and_validation_errors() {
        assert!(matches!(
            parse_dataset("{not json").unwrap_err(),
            DatasetError::Json(_)
        ));
        assert!(matches!(
            parse_dataset("[]").unwrap_err(),
            DatasetError::Invalid(DatasetValidationError::Empty)
        ));
        assert!(!parse_dataset("[]").unwrap_err().is_transport());
    }

    #[test]
    fn source_from_str_detects_urls() {
        assert_eq!(
            "https://example.org/data.json".parse::<DatasetSource>().unwrap(),
            DatasetSource::Url("https://example.org/data.json".to_string())
        );
        assert_eq!(
            "data/field_reports_aggregated.json"
                .parse::<DatasetSource>()
                .unwrap(),
            DatasetSource::File(PathBuf::from("data/field_reports_aggregated.json"))
        );
    }

    #[tokio::test]
    async fn loads_from_file() {
        let path = std::env::temp_dir().join("globe_dataset_loads_from_file.json");
        std::fs::write(&path, ONE_MONTH).unwrap();

        let source = DatasetSource::File(path.clone());
        let dataset = source
            .load(&reqwest::Client::new(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(dataset.total_reports(), 3);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_file_is_a_transport_error() {
        let source = DatasetSource::File(PathBuf::from("/nonexistent/globe/dataset.json"));
        let err = source
            .load(&reqwest::Client::new(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io(_)));
        assert!(err.is_transport());
    }
}
