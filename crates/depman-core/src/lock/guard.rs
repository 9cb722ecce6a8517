//! RAII lock guard

use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Holds an exclusive advisory lock until dropped.
#[derive(Debug)]
pub struct LockGuard {
    pub(crate) file: File,
    pub(crate) path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Closing the descriptor releases the lock too; unlocking first makes
        // the release visible before the file handle is torn down.
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::debug!(path = %self.path.display(), error = %e, "failed to unlock cache lock");
        }
    }
}
