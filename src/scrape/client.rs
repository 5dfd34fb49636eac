//! HTTP client creation for channel page requests.

use anyhow::Result;
use tracing::debug;

use crate::TARGET_WEB_REQUEST;

/// Create the client used for every channel request. No custom headers, default redirects.
pub fn create_http_client() -> Result<reqwest::Client> {
    debug!(target: TARGET_WEB_REQUEST, "Creating HTTP client");

    reqwest::Client::builder()
        .gzip(true)
        .redirect(reqwest::redirect::Policy::default())
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))
}
