//! Server mode toggles.
//!
//! The host picks its PHP handler from a one-line `.htaccess`. Uploads run
//! under the default handler (`php 1`), everything else under the legacy one
//! (`php56 1`). Switching mode rewrites that file; nothing else changes.

use std::io::Write;
use std::path::{Path, PathBuf};

use chunkpost_core::request::function;
use chunkpost_core::ChunkError;

use crate::fs::{ChunkFs, OpenMode};

pub const MODE_FILE_NAME: &str = ".htaccess";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
    Default,
    Upload,
}

impl ServerMode {
    /// The mode file's full contents.
    pub fn directive(self) -> &'static str {
        match self {
            ServerMode::Default => "php56 1\n",
            ServerMode::Upload => "php 1\n",
        }
    }

    /// The mode selected by a `function` value, if it names one.
    pub fn from_function(name: &str) -> Option<Self> {
        match name {
            function::SET_DEFAULT_MODE => Some(ServerMode::Default),
            function::SET_UPLOAD_MODE => Some(ServerMode::Upload),
            _ => None,
        }
    }
}

pub struct ServerModeWriter<F: ChunkFs> {
    fs: F,
    path: PathBuf,
}

impl<F: ChunkFs> ServerModeWriter<F> {
    /// Writes `.htaccess` inside `dir`.
    pub fn new(fs: F, dir: impl AsRef<Path>) -> Self {
        Self {
            fs,
            path: dir.as_ref().join(MODE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_mode(&self, mode: ServerMode) -> Result<(), ChunkError> {
        let mut handle = self
            .fs
            .open(&self.path, OpenMode::Truncate)
            .map_err(ChunkError::FileOpen)?;
        handle
            .write_all(mode.directive().as_bytes())
            .map_err(ChunkError::Write)?;
        self.fs.close(handle).map_err(ChunkError::FileClose)?;

        tracing::info!(?mode, path = %self.path.display(), "server mode set");
        Ok(())
    }
}
