pub mod chain;
pub mod flux;
pub mod lumalabs;
pub mod stability;
pub mod stock_assets;
pub mod veo;

use anyhow::{Result, bail};

/// Turns a non-2xx provider response into an error carrying the status and
/// response body, so chain logs show what the backend actually said.
pub(crate) async fn ensure_success(
    resp: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    bail!("{} request failed with {}: {}", context, status, body)
}
