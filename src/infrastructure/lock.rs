//! Output-tree run lock
//!
//! One `generate` or `rollback` at a time per state directory. The lock is an
//! advisory `fs2` exclusive lock on `<state_dir>/run.lock`, released when the
//! guard drops.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{MocksmithError, MocksmithResult};

pub const LOCK_FILE: &str = "run.lock";

#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Acquire the lock without waiting; fails with `Locked` if held elsewhere.
    pub fn acquire(state_dir: &Path) -> MocksmithResult<Self> {
        fs::create_dir_all(state_dir)?;
        let path = state_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)?;
        file.try_lock_exclusive()
            .map_err(|_| MocksmithError::Locked { path: path.clone() })?;
        tracing::debug!(path = %path.display(), "acquired run lock");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
