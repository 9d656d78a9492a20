//! Native Tag Parsing Capability
//!
//! Hosts usually ship a platform tag library (TagLib, MediaMetadataRetriever,
//! lofty). The core only needs its raw output: one key→values map per tag
//! family plus the embedded cover, if any.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;

/// Raw container metadata as reported by the native tag library.
///
/// Keys follow the conventions of each family:
/// - `id3v2`: frame IDs (`TIT2`, `TPE1`), user text frames as `TXXX:<DESC>`
/// - `xiph`: upper-cased Vorbis comment field names (`TITLE`, `ALBUMARTIST`)
/// - `mp4`: atom names (`©nam`, `aART`) and freeform atoms as
///   `----:com.apple.iTunes:<NAME>`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTags {
    pub id3v2: HashMap<String, Vec<String>>,
    pub xiph: HashMap<String, Vec<String>>,
    pub mp4: HashMap<String, Vec<String>>,
    pub duration_ms: Option<u64>,
    pub cover: Option<Bytes>,
}

impl RawTags {
    pub fn is_empty(&self) -> bool {
        self.id3v2.is_empty() && self.xiph.is_empty() && self.mp4.is_empty()
    }

    pub fn push_id3v2(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.id3v2.entry(key.into()).or_default().push(value.into());
    }

    pub fn push_xiph(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.xiph
            .entry(key.as_ref().to_uppercase())
            .or_default()
            .push(value.into());
    }

    pub fn push_mp4(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.mp4.entry(key.into()).or_default().push(value.into());
    }
}

/// Native tag-parse capability.
#[async_trait]
pub trait TagReader: Send + Sync {
    /// Read raw tags and embedded artwork from an audio file.
    ///
    /// Returns [`BridgeError::InvalidTags`](crate::error::BridgeError::InvalidTags)
    /// when the container cannot be parsed.
    async fn read_tags(&self, path: &Path) -> Result<RawTags>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use mockall::mock;
    use std::path::PathBuf;

    mock! {
        Reader {}

        #[async_trait]
        impl TagReader for Reader {
            async fn read_tags(&self, path: &Path) -> Result<RawTags>;
        }
    }

    #[test]
    fn test_push_normalizes_xiph_keys() {
        let mut tags = RawTags::default();
        tags.push_xiph("albumartist", "Boards of Canada");
        tags.push_xiph("ALBUMARTIST", "Other");

        assert_eq!(
            tags.xiph.get("ALBUMARTIST"),
            Some(&vec!["Boards of Canada".to_string(), "Other".to_string()])
        );
        assert!(!tags.is_empty());
    }

    #[test]
    fn test_default_is_empty() {
        let tags = RawTags::default();
        assert!(tags.is_empty());
        assert!(tags.cover.is_none());
    }

    #[tokio::test]
    async fn test_mock_reader_surfaces_errors() {
        let mut reader = MockReader::new();
        reader
            .expect_read_tags()
            .returning(|path| Err(BridgeError::InvalidTags(path.display().to_string())));

        let result = reader.read_tags(&PathBuf::from("/music/broken.mp3")).await;
        assert!(matches!(result, Err(BridgeError::InvalidTags(_))));
    }
}
