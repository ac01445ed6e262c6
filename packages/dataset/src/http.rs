//! Single-attempt HTTP helpers with an explicit timeout.
//!
//! Startup fetches are not retried: a failure is reported to the user
//! immediately. Every request carries a timeout so a hung server surfaces
//! as [`DatasetError::Timeout`] through the same failure path as any other
//! fetch error.

use std::time::Duration;

use crate::DatasetError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 200;

/// Sends a `GET` request and returns the body as text.
///
/// # Errors
///
/// Returns [`DatasetError::Timeout`] if the request or body read exceeds
/// `timeout`, [`DatasetError::Status`] for any non-2xx response, and
/// [`DatasetError::Http`] for other transport failures.
pub async fn get_text(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<String, DatasetError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| classify_error(e, url, timeout))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::error!(
            "GET {url} failed with HTTP {status}\n  body preview: {}",
            preview(&body)
        );
        return Err(DatasetError::Status {
            url: url.to_string(),
            status,
        });
    }

    response
        .text()
        .await
        .map_err(|e| classify_error(e, url, timeout))
}

/// Maps a `reqwest` error onto the dataset error taxonomy.
fn classify_error(e: reqwest::Error, url: &str, timeout: Duration) -> DatasetError {
    if e.is_timeout() {
        log::error!("GET {url} timed out after {timeout:?}");
        DatasetError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else {
        log::error!("GET {url} failed: {e}");
        DatasetError::Http(e)
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
