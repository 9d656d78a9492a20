use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Missing required tag (song name) for {}", .path.display())]
    MissingRequiredTag { path: PathBuf },

    #[error("Failed to extract metadata: {0}")]
    ExtractionFailed(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to identify cover: {0}")]
    IdentifyFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageError(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::error::BridgeError),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),
}

impl MetadataError {
    /// Whether the cover store or the file system failed, as opposed to one
    /// file's data being unusable
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            MetadataError::Io(_) | MetadataError::Bridge(_) | MetadataError::Library(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MetadataError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;

    #[test]
    fn test_storage_failures() {
        assert!(MetadataError::Bridge(BridgeError::NotFound("/covers".into())).is_storage_failure());
        assert!(MetadataError::Library(core_library::LibraryError::Migration("gone".into()))
            .is_storage_failure());
        assert!(!MetadataError::IdentifyFailure("empty".into()).is_storage_failure());
        assert!(!MetadataError::ImageError("truncated jpeg".into()).is_storage_failure());
    }
}
