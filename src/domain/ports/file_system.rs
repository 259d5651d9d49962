//! FileSystem port - abstraction over file I/O operations
//!
//! The executor, journal and rollback controller only touch the output tree
//! through this trait, which lets tests inject failures at exact points.

use std::path::{Path, PathBuf};

use crate::domain::value_objects::Fingerprint;

/// Result type for file system operations
pub type FsResult<T> = Result<T, FsError>;

/// File system operation errors
#[derive(Debug)]
pub enum FsError {
    /// File not found
    NotFound(PathBuf),
    /// Permission denied
    PermissionDenied(PathBuf),
    /// I/O error
    Io(std::io::Error),
    /// Other error
    Other(String),
}

impl FsError {
    /// Attach a path to an I/O error
    pub fn at(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path.to_path_buf()),
            _ => FsError::Io(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }
}

impl From<std::io::Error> for FsError {
    fn from(err: std::io::Error) -> Self {
        FsError::at(Path::new(""), err)
    }
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsError::NotFound(path) => write!(f, "File not found: {}", path.display()),
            FsError::PermissionDenied(path) => {
                write!(f, "Permission denied: {}", path.display())
            }
            FsError::Io(err) => write!(f, "I/O error: {}", err),
            FsError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FsError {}

/// Abstract file system interface
///
/// Implementations:
/// - `LocalFs` - standard file I/O with atomic replacement
/// - test doubles that fail selected operations
pub trait FileSystem {
    /// Read file content as bytes
    fn read(&self, path: &Path) -> FsResult<Vec<u8>>;

    /// Read file content as UTF-8 text
    fn read_to_string(&self, path: &Path) -> FsResult<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes)
            .map_err(|e| FsError::Other(format!("{} is not UTF-8: {}", path.display(), e)))
    }

    /// Write content to file atomically, creating parent directories
    fn write(&self, path: &Path, content: &[u8]) -> FsResult<()>;

    /// Move a file into place, replacing any existing file
    fn rename(&self, from: &Path, to: &Path) -> FsResult<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Remove a file
    fn remove(&self, path: &Path) -> FsResult<()>;

    /// Remove an empty directory
    fn remove_dir(&self, path: &Path) -> FsResult<()>;

    /// Remove a directory and everything below it
    fn remove_dir_all(&self, path: &Path) -> FsResult<()>;

    /// Create directory and parents
    fn create_dir_all(&self, path: &Path) -> FsResult<()>;

    /// Immediate subdirectories of a directory, in no particular order
    fn list_dirs(&self, path: &Path) -> FsResult<Vec<PathBuf>>;

    /// Compute content fingerprint (SHA-256)
    fn hash(&self, path: &Path) -> FsResult<Fingerprint> {
        self.read(path).map(|bytes| Fingerprint::from_bytes(&bytes))
    }
}
