//! In-memory `ChunkFs` with fault injection.
//!
//! Writes land in the shared map as they happen, not at close, so a failure
//! after the write leaves the bytes visible the way a real file would.

use std::collections::{HashMap, HashSet};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::fs::{ChunkFs, OpenMode};

/// Failures to inject. Each flag makes the matching call fail.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub mkdir: bool,
    pub open: bool,
    pub seek: bool,
    pub write: bool,
    pub close: bool,
    /// Max bytes a single handle accepts before writes return 0.
    pub write_limit: Option<usize>,
}

#[derive(Default)]
struct MemState {
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
    faults: Faults,
}

#[derive(Clone, Default)]
pub struct MemFs {
    state: Arc<Mutex<MemState>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faults(faults: Faults) -> Self {
        let fs = Self::new();
        fs.set_faults(faults);
        fs
    }

    pub fn set_faults(&self, faults: Faults) {
        self.lock().faults = faults;
    }

    /// Contents of a file, if it exists.
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.lock().files.get(path.as_ref()).cloned()
    }

    /// Seed a file, creating its ancestors.
    pub fn insert_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut state = self.lock();
        if let Some(parent) = path.parent() {
            add_ancestors(&mut state.dirs, parent);
        }
        state.files.insert(path.to_path_buf(), contents.into());
    }

    /// Seed a directory, creating its ancestors.
    pub fn insert_dir(&self, path: impl AsRef<Path>) {
        add_ancestors(&mut self.lock().dirs, path.as_ref());
    }

    fn lock(&self) -> MutexGuard<'_, MemState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_root(path: &Path) -> bool {
    path.as_os_str().is_empty() || path.parent().is_none()
}

fn add_ancestors(dirs: &mut HashSet<PathBuf>, path: &Path) {
    for ancestor in path.ancestors().filter(|p| !is_root(p)) {
        dirs.insert(ancestor.to_path_buf());
    }
}

fn injected(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("injected {what} failure"))
}

impl ChunkFs for MemFs {
    type Handle = MemHandle;

    fn is_dir(&self, path: &Path) -> bool {
        is_root(path) || self.lock().dirs.contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        if state.faults.mkdir {
            return Err(injected("mkdir"));
        }
        if let Some(blocker) = path.ancestors().find(|p| state.files.contains_key(*p)) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is not a directory", blocker.display()),
            ));
        }
        add_ancestors(&mut state.dirs, path);
        Ok(())
    }

    fn open(&self, path: &Path, mode: OpenMode) -> io::Result<MemHandle> {
        let mut state = self.lock();
        if state.faults.open {
            return Err(injected("open"));
        }
        if path.as_os_str().is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
        }
        if is_root(path) || state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is a directory", path.display()),
            ));
        }
        let parent_exists = path
            .parent()
            .map_or(true, |p| is_root(p) || state.dirs.contains(p));
        if !parent_exists {
            return Err(io::Error::new(io::ErrorKind::NotFound, "parent missing"));
        }

        match mode {
            OpenMode::Truncate => {
                state.files.insert(path.to_path_buf(), Vec::new());
            }
            OpenMode::Overwrite => {
                state.files.entry(path.to_path_buf()).or_default();
            }
        }

        Ok(MemHandle {
            state: self.state.clone(),
            path: path.to_path_buf(),
            pos: 0,
            accepted: 0,
        })
    }

    fn close(&self, _handle: MemHandle) -> io::Result<()> {
        if self.lock().faults.close {
            return Err(injected("close"));
        }
        Ok(())
    }
}

pub struct MemHandle {
    state: Arc<Mutex<MemState>>,
    path: PathBuf,
    pos: u64,
    accepted: usize,
}

impl Write for MemHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.faults.write {
            return Err(injected("write"));
        }
        let n = match state.faults.write_limit {
            Some(limit) => buf.len().min(limit.saturating_sub(self.accepted)),
            None => buf.len(),
        };
        if n == 0 {
            return Ok(0);
        }

        let start = usize::try_from(self.pos)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "position too large"))?;
        let file = state.files.entry(self.path.clone()).or_default();
        if file.len() < start + n {
            file.resize(start + n, 0);
        }
        file[start..start + n].copy_from_slice(&buf[..n]);

        self.pos += n as u64;
        self.accepted += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.faults.seek {
            return Err(injected("seek"));
        }
        let len = state.files.get(&self.path).map_or(0, |f| f.len() as u64);
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(delta) => len.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        self.pos = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of file")
        })?;
        Ok(self.pos)
    }
}
