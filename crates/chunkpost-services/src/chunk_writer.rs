//! Applies one chunk to a destination file.
//!
//! The write sequence is fixed: ensure the parent directory, open, seek,
//! verify the checksum, write, verify the written length, close. The first
//! failing step aborts the rest. Nothing already applied is rolled back, so a
//! size or close failure can leave a partially written file behind. Retrying
//! is the caller's job, as a fresh request.
//!
//! Concurrent writes to the same path are not coordinated unless the writer
//! is built with `with_path_locks`. Without it, overlapping chunks from
//! parallel requests may interleave.

use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use chunkpost_core::checksum;
use chunkpost_core::{ChunkError, ChunkRequest};

use crate::fs::{ChunkFs, OpenMode};
use crate::path_lock::PathLocks;

pub struct ChunkWriter<F: ChunkFs> {
    fs: F,
    locks: Option<PathLocks>,
}

impl<F: ChunkFs> ChunkWriter<F> {
    pub fn new(fs: F) -> Self {
        Self { fs, locks: None }
    }

    /// Serialize writes that target the same destination path.
    pub fn with_path_locks(mut self, locks: PathLocks) -> Self {
        self.locks = Some(locks);
        self
    }

    pub fn write_chunk(&self, request: &ChunkRequest) -> Result<(), ChunkError> {
        let result = match &self.locks {
            Some(locks) => locks.with_lock(&request.path, || self.apply(request)),
            None => self.apply(request),
        };

        match &result {
            Ok(()) => tracing::debug!(
                path = %request.path.display(),
                offset = request.offset,
                bytes = request.payload.len(),
                "chunk written"
            ),
            Err(e) => tracing::warn!(
                path = %request.path.display(),
                offset = request.offset,
                label = %e,
                cause = ?std::error::Error::source(e).map(ToString::to_string),
                "chunk write failed"
            ),
        }
        result
    }

    fn apply(&self, request: &ChunkRequest) -> Result<(), ChunkError> {
        let path = request.path.as_path();
        self.ensure_parent(path)?;

        let mode = if request.offset == 0 {
            OpenMode::Truncate
        } else {
            OpenMode::Overwrite
        };
        let mut handle = self.fs.open(path, mode).map_err(ChunkError::FileOpen)?;

        if request.offset != 0 {
            let position = u64::try_from(request.offset).map_err(|_| {
                ChunkError::Seek(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("negative offset {}", request.offset),
                ))
            })?;
            handle
                .seek(SeekFrom::Start(position))
                .map_err(ChunkError::Seek)?;
        }

        // Early returns from here on drop `handle`, which closes it.
        if !checksum::matches(&request.payload, &request.checksum) {
            return Err(ChunkError::ChecksumMismatch {
                expected: request.checksum.clone(),
                actual: checksum::sha1_hex(&request.payload),
            });
        }

        let (written, write_error) = write_payload(&mut handle, &request.payload);
        if i64::try_from(written).ok() != Some(request.declared_size) {
            if let Some(e) = &write_error {
                tracing::debug!(path = %path.display(), written, error = %e, "write stopped early");
            }
            return Err(ChunkError::SizeMismatch {
                declared: request.declared_size,
                written,
            });
        }
        if let Some(e) = write_error {
            return Err(ChunkError::Write(e));
        }

        self.fs.close(handle).map_err(ChunkError::FileClose)
    }

    fn ensure_parent(&self, path: &Path) -> Result<(), ChunkError> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };
        if self.fs.is_dir(parent) {
            return Ok(());
        }
        self.fs
            .create_dir_all(parent)
            .map_err(ChunkError::DirectoryCreate)
    }
}

/// Write as much of `payload` as the handle accepts. Returns the count
/// written, plus the error that stopped it early if any. A zero-length write
/// ends the attempt without an error.
fn write_payload<W: Write>(handle: &mut W, payload: &[u8]) -> (usize, Option<io::Error>) {
    let mut written = 0;
    while written < payload.len() {
        match handle.write(&payload[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return (written, Some(e)),
        }
    }
    (written, None)
}
