//! chunkpostd: chunked remote file write endpoint.

use anyhow::{Context, Result};

use chunkpost_core::config::ChunkpostConfig;
use chunkpost_services::LocalFs;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = ChunkpostConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = ChunkpostConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        ChunkpostConfig::default()
    });

    let root = config.storage.root.clone();
    std::fs::create_dir_all(&root)
        .with_context(|| format!("failed to create storage root: {}", root.display()))?;
    tracing::info!(
        root = %root.display(),
        mode_file_dir = %config.storage.mode_file_dir.display(),
        serialize_writes = config.server.serialize_writes,
        "chunkpostd starting"
    );
    if !config.server.serialize_writes {
        tracing::debug!("concurrent writes to the same path are not coordinated");
    }

    let state = chunkpost_api::ApiState::new(
        LocalFs::new(root),
        &config.storage.mode_file_dir,
        config.server.serialize_writes,
    );

    tokio::select! {
        r = chunkpost_api::serve(state, &config.server) => r?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}
