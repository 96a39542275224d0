//! Lifecycle of the scratch directories archives are extracted into.
//!
//! A [`ScratchRegistry`] is created once at start-up and passed to whatever
//! allocates scratch space. [`ScratchRegistry::cleanup`] is the teardown; it
//! runs after every batch has finished. Anything still registered when the
//! registry is dropped is removed by `TempDir`'s own drop.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::TempDir;
use tracing::{debug, error, info};

const SCRATCH_PREFIX: &str = "doc2pdf-";

#[derive(Debug, Default)]
pub struct ScratchRegistry {
    dirs: Mutex<Vec<TempDir>>,
}

impl ScratchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh scratch directory and register it for teardown.
    pub fn allocate(&self) -> io::Result<PathBuf> {
        let dir = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
        let path = dir.path().to_path_buf();
        self.lock().push(dir);
        debug!(path = %path.display(), "Registered scratch directory");
        Ok(path)
    }

    /// True when `path` is, or lives inside, a registered scratch directory.
    pub fn contains(&self, path: &Path) -> bool {
        self.lock().iter().any(|dir| path.starts_with(dir.path()))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every registered directory. Returns how many were removed;
    /// calling it again is a no-op.
    pub fn cleanup(&self) -> usize {
        let dirs: Vec<TempDir> = self.lock().drain(..).collect();
        let mut removed = 0;
        for dir in dirs {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => {
                    info!(path = %path.display(), "Cleaned up temporary directory");
                    removed += 1;
                }
                Err(e) => {
                    error!(error = ?e, path = %path.display(), "Failed to remove temporary directory");
                }
            }
        }
        removed
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TempDir>> {
        self.dirs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
