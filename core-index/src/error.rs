use bridge_traits::error::BridgeError;
use core_library::LibraryError;
use core_metadata::MetadataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Indexing cancelled")]
    Cancelled,

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Cover storage failed: {0}")]
    CoverStorage(#[source] MetadataError),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Pipeline stage {stage} failed: {message}")]
    Stage { stage: &'static str, message: String },
}

impl IndexError {
    /// Whether the error only concerns the file being extracted, so the run
    /// can go on without it
    pub fn is_file_failure(&self) -> bool {
        matches!(self, IndexError::Metadata(_) | IndexError::Bridge(_))
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
