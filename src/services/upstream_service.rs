//! Calls to the configured upstream service.
//!
//! Upstream problems surface as [`Failure`]s. A non-success status carries
//! the upstream response headers so the client sees them in the error body.

use axum::http::header;
use serde_json::Value;
use url::Url;

use crate::error::{Failure, UpstreamResponse};

/// Category label for non-success upstream responses.
pub const UPSTREAM_ERROR: &str = "UpstreamError";

/// Fetch the upstream status document.
///
/// # Process
///
/// 1. GET the URL with `Accept: application/json`
/// 2. Non-success status: fail with `UpstreamError` (HTTP 502) carrying the
///    upstream headers
/// 3. Decode the body as JSON
///
/// # Errors
///
/// Transport and decoding errors convert through `From<reqwest::Error>`.
pub async fn fetch_status(client: &reqwest::Client, url: &Url) -> Result<Value, Failure> {
    let response = client
        .get(url.clone())
        .header(header::ACCEPT, "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%url, %status, "upstream returned an error status");

        let upstream = UpstreamResponse::from_reqwest(&response);
        return Err(Failure::new(
            UPSTREAM_ERROR,
            format!("Upstream responded with {}.", status),
        )
        .with_status(502)
        .with_response(upstream));
    }

    Ok(response.json::<Value>().await?)
}
