//! Chunked upload of a local file.
//!
//! The file is read and posted one chunk at a time, each carrying its offset,
//! size and SHA-1. A failed chunk is re-posted as a fresh request. The server
//! is switched to upload mode for the duration and always switched back.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use chunkpost_core::checksum::sha1_hex;
use chunkpost_core::ChunkRequest;

use super::http::post_form;
use super::mode::{set_mode, Mode};

pub const DEFAULT_CHUNK_SIZE: usize = 2 * 1024 * 1024;
pub const DEFAULT_MAX_TRY: u32 = 5;

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub chunk_size: usize,
    /// Extra attempts per chunk after the first failure.
    pub max_try: u32,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_try: DEFAULT_MAX_TRY,
        }
    }
}

pub async fn cmd_upload(
    url: &str,
    local: &Path,
    remote: Option<&Path>,
    options: &UploadOptions,
) -> Result<()> {
    let remote = match remote {
        Some(r) => r.to_path_buf(),
        None => default_remote(local)?,
    };
    let client = reqwest::Client::new();

    set_mode(&client, url, Mode::Upload).await?;
    let result = upload_file(&client, url, local, &remote, options).await;
    let restored = set_mode(&client, url, Mode::Default).await;

    let bytes = result?;
    restored.context("upload finished but restoring default mode failed")?;

    println!("Upload complete:");
    println!("  Local  : {}", local.display());
    println!("  Remote : {}", remote.display());
    println!("  Bytes  : {}", bytes);
    Ok(())
}

/// Upload every chunk of `local`. Returns the total bytes sent.
async fn upload_file(
    client: &reqwest::Client,
    url: &str,
    local: &Path,
    remote: &Path,
    options: &UploadOptions,
) -> Result<u64> {
    let mut file = tokio::fs::File::open(local)
        .await
        .with_context(|| format!("failed to open {}", local.display()))?;
    let total = file.metadata().await?.len();
    let chunk_count = chunk_count(total, options.chunk_size);
    let started = Instant::now();

    let mut offset = 0u64;
    let mut index = 0u64;
    loop {
        let data = read_chunk(&mut file, options.chunk_size)
            .await
            .with_context(|| format!("failed to read {}", local.display()))?;
        // An empty file still gets one empty chunk so the remote file exists.
        if data.is_empty() && index > 0 {
            break;
        }
        let len = data.len();
        index += 1;

        tracing::info!(
            local = %local.display(),
            remote = %remote.display(),
            bytes = format_args!("{}/{}", offset + len as u64, total),
            chunks = format_args!("{}/{}", index, chunk_count),
            remaining = ?remaining_time(started.elapsed(), offset, total),
            "uploading"
        );

        let request = build_request(remote, offset, data)?;
        post_with_retry(client, url, &request.to_form(), options.max_try)
            .await
            .with_context(|| format!("chunk {} at offset {} failed", index, offset))?;

        offset += len as u64;
        if len < options.chunk_size {
            break;
        }
    }
    Ok(offset)
}

async fn post_with_retry(
    client: &reqwest::Client,
    url: &str,
    form: &[(&str, String)],
    max_try: u32,
) -> Result<()> {
    let mut attempt = 0;
    loop {
        match post_form(client, url, form).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < max_try => {
                attempt += 1;
                tracing::warn!(error = %e, attempt, max_try, "chunk upload failed, retrying");
            }
            Err(e) => return Err(e),
        }
    }
}

fn default_remote(local: &Path) -> Result<PathBuf> {
    local
        .file_name()
        .map(PathBuf::from)
        .with_context(|| format!("cannot derive a remote name from {}", local.display()))
}

pub fn build_request(remote: &Path, offset: u64, data: Vec<u8>) -> Result<ChunkRequest> {
    Ok(ChunkRequest {
        path: remote.to_path_buf(),
        offset: i64::try_from(offset).context("offset out of range")?,
        checksum: sha1_hex(&data),
        declared_size: i64::try_from(data.len()).context("chunk too large")?,
        payload: Bytes::from(data),
    })
}

/// Read up to `chunk_size` bytes, fewer only at end of input.
pub async fn read_chunk<R>(reader: &mut R, chunk_size: usize) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(chunk_size);
    reader.take(chunk_size as u64).read_to_end(&mut buf).await?;
    Ok(buf)
}

pub fn chunk_count(total: u64, chunk_size: usize) -> u64 {
    total.div_ceil(chunk_size as u64).max(1)
}

/// Linear estimate from the bytes already confirmed.
pub fn remaining_time(elapsed: Duration, done: u64, total: u64) -> Duration {
    if done == 0 {
        return Duration::ZERO;
    }
    let projected = elapsed.mul_f64(total as f64 / done as f64);
    projected.saturating_sub(elapsed)
}
