//! HTTP plumbing shared by the network backends

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Upper bound for establishing a connection to a backend
///
/// Whole-request deadlines are enforced by the caller's timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client with a connect timeout; falls back to reqwest defaults if the
/// builder cannot be initialised
pub(crate) fn build_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}

/// Base URL without trailing slashes
pub(crate) fn base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Send `request`, mapping non-2xx answers to `Error::Ai` with the body text
pub(crate) async fn send(provider: &str, request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Ai(format!("{} returned {}: {}", provider, status, body.trim())))
}

/// True when `request` answers 2xx
pub(crate) async fn answers_ok(request: RequestBuilder) -> bool {
    match request.send().await {
        Ok(resp) => resp.status().is_success(),
        Err(e) => {
            debug!(error = %e, "Health check request failed");
            false
        }
    }
}

/// Reject blank completions so callers can treat them as failures
pub(crate) fn non_empty(provider: &str, text: Option<String>) -> Result<String> {
    text.filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::Ai(format!("{} returned no text", provider)))
}
