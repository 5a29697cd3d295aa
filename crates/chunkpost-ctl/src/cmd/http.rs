//! Shared HTTP request helpers for CLI commands.

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;

pub const DEFAULT_URL: &str = "http://127.0.0.1:8080/upload.php";

/// Post one form to the endpoint. Anything but `200` is a failure carrying
/// the server's error label.
pub async fn post_form(client: &reqwest::Client, url: &str, form: &[(&str, String)]) -> Result<()> {
    let resp = client
        .post(url)
        .form(form)
        .send()
        .await
        .with_context(|| format!("failed to connect to {} — is chunkpostd running?", url))?;

    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        bail!("server answered {}: {}", status.as_u16(), body);
    }
    Ok(())
}
