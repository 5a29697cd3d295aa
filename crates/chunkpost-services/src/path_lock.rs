//! Per-destination serialization of chunk writes.
//!
//! Without it, two requests targeting the same file race at the descriptor
//! level and may interleave bytes. Writes to different paths never contend.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

#[derive(Clone, Default)]
pub struct PathLocks {
    locks: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `path`.
    pub fn with_lock<R>(&self, path: &Path, f: impl FnOnce() -> R) -> R {
        let lock = self
            .locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        drop(lock);
        // Only the map's own reference left: nobody else is waiting.
        self.locks
            .remove_if(path, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    /// Paths with a writer currently holding or waiting on the lock.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}
