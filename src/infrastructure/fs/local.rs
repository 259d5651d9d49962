//! Local File System Implementation
//!
//! Implements the FileSystem port for local disk operations.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::ports::file_system::{FileSystem, FsError, FsResult};

/// Local file system implementation
///
/// Writes go through a temp file in the target directory followed by a
/// rename, so readers never observe a half-written file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new LocalFs instance
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn read(&self, path: &Path) -> FsResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| FsError::at(path, e))
    }

    fn write(&self, path: &Path, content: &[u8]) -> FsResult<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| FsError::at(parent, e))?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| FsError::at(parent, e))?;
        temp.write_all(content).map_err(|e| FsError::at(path, e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| FsError::at(path, e))?;
        temp.persist(path)
            .map_err(|e| FsError::at(path, e.error))?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FsError::at(parent, e))?;
        }
        match std::fs::rename(from, to) {
            Ok(()) => Ok(()),
            // Cross-device: copy into a temp file next to the target, then rename.
            Err(e) if from.is_file() && e.kind() != std::io::ErrorKind::PermissionDenied => {
                let bytes = self.read(from)?;
                self.write(to, &bytes)?;
                std::fs::remove_file(from).map_err(|e| FsError::at(from, e))
            }
            Err(e) => Err(FsError::at(from, e)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn remove(&self, path: &Path) -> FsResult<()> {
        std::fs::remove_file(path).map_err(|e| FsError::at(path, e))
    }

    fn remove_dir(&self, path: &Path) -> FsResult<()> {
        std::fs::remove_dir(path).map_err(|e| FsError::at(path, e))
    }

    fn remove_dir_all(&self, path: &Path) -> FsResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| FsError::at(path, e))
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        std::fs::create_dir_all(path).map_err(|e| FsError::at(path, e))
    }

    fn list_dirs(&self, path: &Path) -> FsResult<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(path).map_err(|e| FsError::at(path, e))? {
            let entry = entry.map_err(|e| FsError::at(path, e))?;
            let file_type = entry.file_type().map_err(|e| FsError::at(&entry.path(), e))?;
            if file_type.is_dir() {
                dirs.push(entry.path());
            }
        }
        Ok(dirs)
    }
}
