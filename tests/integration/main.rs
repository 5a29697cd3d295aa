//! chunkpost integration test harness.
//!
//! Each test starts its own endpoint on 127.0.0.1 with an OS-assigned port,
//! backed by a fresh temp directory, and talks to it over real HTTP.
//!
//!   cargo test --test integration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use chunkpost_core::checksum::sha1_hex;
use chunkpost_core::config::ServerConfig;
use chunkpost_core::request::encode_b64;
use chunkpost_services::LocalFs;

mod concurrency;
mod dispatch;
mod upload;

// ── Harness ───────────────────────────────────────────────────────────────────

pub struct TestServer {
    pub url: String,
    pub root: tempfile::TempDir,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(false).await
    }

    /// Start an endpoint mounted at the default route.
    pub async fn start_with(serialize_writes: bool) -> Result<Self> {
        let root = tempfile::tempdir().context("failed to create storage root")?;
        let config = ServerConfig {
            port: 0,
            serialize_writes,
            ..ServerConfig::default()
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state =
            chunkpost_api::ApiState::new(LocalFs::new(root.path()), ".", serialize_writes);

        let task = tokio::spawn(async move {
            if let Err(e) = chunkpost_api::serve_on(listener, state, &config).await {
                eprintln!("test server failed: {e}");
            }
        });

        Ok(Self {
            url: format!("http://{addr}/upload.php"),
            root,
            task,
        })
    }

    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.path().join(rel)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct Reply {
    pub status: u16,
    pub robots: Option<String>,
    pub body: String,
}

pub async fn post(url: &str, form: &[(&str, String)]) -> Result<Reply> {
    let resp = reqwest::Client::new()
        .post(url)
        .form(form)
        .send()
        .await
        .with_context(|| format!("failed to reach {url}"))?;
    reply(resp).await
}

pub async fn reply(resp: reqwest::Response) -> Result<Reply> {
    let status = resp.status().as_u16();
    let robots = resp
        .headers()
        .get("x-robots-tag")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = resp.text().await?;
    Ok(Reply {
        status,
        robots,
        body,
    })
}

/// Form for one chunk in the legacy field spelling.
pub fn chunk_form(path: &str, offset: u64, data: &[u8]) -> Vec<(&'static str, String)> {
    vec![
        ("function", "upload".to_string()),
        ("filepath_b64", encode_b64(path)),
        ("checksum_sha1", sha1_hex(data)),
        ("size", data.len().to_string()),
        ("offset", offset.to_string()),
        ("data_b64", encode_b64(data)),
    ]
}

/// Replace one field of a form.
pub fn with_field(
    mut form: Vec<(&'static str, String)>,
    name: &'static str,
    value: &str,
) -> Vec<(&'static str, String)> {
    form.retain(|(k, _)| *k != name);
    form.push((name, value.to_string()));
    form
}
