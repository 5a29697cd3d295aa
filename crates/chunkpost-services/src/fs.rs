//! Filesystem seam for chunk writes.
//!
//! The destination files are the only durable state in the system. Everything
//! that touches them goes through `ChunkFs`, so tests can run the full write
//! sequence against `MemFs` instead of a real disk.

use std::fs;
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};

/// How a destination is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Create if absent, discard existing content.
    Truncate,
    /// Create if absent, keep existing content. Writes land at the cursor.
    Overwrite,
}

pub trait ChunkFs: Clone + Send + Sync + 'static {
    type Handle: Write + Seek + Send;

    fn is_dir(&self, path: &Path) -> bool;

    /// Create `path` and all missing ancestors.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn open(&self, path: &Path, mode: OpenMode) -> io::Result<Self::Handle>;

    /// Flush and release a handle. Dropping a handle also releases it, but
    /// without reporting errors.
    fn close(&self, handle: Self::Handle) -> io::Result<()>;
}

/// The real filesystem. Relative paths resolve against `root`.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ChunkFs for LocalFs {
    type Handle = fs::File;

    fn is_dir(&self, path: &Path) -> bool {
        self.resolve(path).is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o777);
        }
        builder.create(self.resolve(path))
    }

    fn open(&self, path: &Path, mode: OpenMode) -> io::Result<fs::File> {
        // An empty path would otherwise resolve to the root directory itself.
        if path.as_os_str().is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
        }
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(mode == OpenMode::Truncate)
            .open(self.resolve(path))
    }

    fn close(&self, mut handle: fs::File) -> io::Result<()> {
        handle.flush()?;
        handle.sync_all()
    }
}
