use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A file found under one of the music roots.
///
/// `(path, last_modified)` identifies one version of the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileHandle {
    pub path: PathBuf,
    /// The root the file was found under
    pub volume: PathBuf,
    /// Modification time in milliseconds since the Unix epoch
    pub last_modified: i64,
    pub size: u64,
}

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>, volume: impl Into<PathBuf>, last_modified: i64, size: u64) -> Self {
        Self {
            path: path.into(),
            volume: volume.into(),
            last_modified,
            size,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// File name without its final extension
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|n| n.to_str())
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// Name of the containing directory, used when a song has no album tag.
    pub fn directory_name(&self) -> Option<&str> {
        self.directory()
            .and_then(|d| d.file_name())
            .and_then(|n| n.to_str())
    }

    /// Path relative to the root it was found under
    pub fn relative_path(&self) -> &Path {
        self.path.strip_prefix(&self.volume).unwrap_or(&self.path)
    }
}
