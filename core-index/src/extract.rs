//! # Extraction
//!
//! Turns a cache miss into a [`RawSong`]: raw tags come from the
//! [`TagReader`], are normalized by the [`TagParser`], and the song's cover is
//! identified through the [`CoverSources`] chain.
//!
//! A cover that cannot be identified costs the song its cover, never the song
//! itself. A failing cover store is an error for the whole run, since caching
//! the song without its cover would hide the cover on later runs.

use bridge_traits::tags::TagReader;
use core_library::models::{CoverId, FileHandle, MusicUid, ParsedTags};
use core_metadata::{CoverCandidate, CoverSources, TagParser};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{IndexError, Result};

/// One file's parsed tags and cover, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSong {
    pub file: FileHandle,
    pub tags: ParsedTags,
    pub cover: Option<CoverId>,
}

impl RawSong {
    pub fn uid(&self) -> MusicUid {
        self.tags.song_uid(&self.file)
    }
}

pub struct Extractor {
    reader: Arc<dyn TagReader>,
    parser: TagParser,
    covers: CoverSources,
}

impl Extractor {
    pub fn new(reader: Arc<dyn TagReader>, covers: CoverSources) -> Self {
        Self {
            reader,
            parser: TagParser::new(),
            covers,
        }
    }

    /// Read, parse and identify the cover of one file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or has no usable name. Both are
    /// per-file failures the caller is expected to skip. Fails with
    /// [`IndexError::CoverStorage`] when the cover store is unavailable.
    pub async fn extract(&self, file: FileHandle) -> Result<RawSong> {
        let raw = self.reader.read_tags(&file.path).await?;
        let tags = self.parser.parse(&file, &raw)?;

        let song_uid = tags.song_uid(&file);
        let candidate = CoverCandidate {
            file: &file,
            song_uid,
            embedded: raw.cover.as_ref(),
        };
        let cover = match self.covers.identify(&candidate).await {
            Ok(cover) => cover,
            Err(e) if e.is_storage_failure() => return Err(IndexError::CoverStorage(e)),
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "Failed to identify cover");
                None
            }
        };

        debug!(path = %file.path.display(), has_cover = cover.is_some(), "Extracted tags");
        Ok(RawSong { file, tags, cover })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::BridgeError;
    use bridge_traits::tags::RawTags;
    use bytes::Bytes;
    use core_metadata::{CoverSource, MetadataError};
    use mockall::mock;
    use std::path::Path;

    mock! {
        Reader {}

        #[async_trait]
        impl TagReader for Reader {
            async fn read_tags(&self, path: &Path) -> bridge_traits::error::Result<RawTags>;
        }
    }

    /// Stores whatever embedded bytes it is given under a fixed ID
    struct EmbeddedOnly;

    #[async_trait]
    impl CoverSource for EmbeddedOnly {
        async fn identify(
            &self,
            candidate: &CoverCandidate<'_>,
        ) -> core_metadata::Result<Option<CoverId>> {
            Ok(candidate
                .embedded
                .map(|data| CoverId::Stored(format!("{}.img", data.len()))))
        }

        async fn open(&self, _id: &CoverId) -> core_metadata::Result<Option<Bytes>> {
            Ok(None)
        }
    }

    struct Broken;

    #[async_trait]
    impl CoverSource for Broken {
        async fn identify(
            &self,
            _candidate: &CoverCandidate<'_>,
        ) -> core_metadata::Result<Option<CoverId>> {
            Err(MetadataError::IdentifyFailure("hash failed".into()))
        }

        async fn open(&self, _id: &CoverId) -> core_metadata::Result<Option<Bytes>> {
            Ok(None)
        }
    }

    struct Unavailable;

    #[async_trait]
    impl CoverSource for Unavailable {
        async fn identify(
            &self,
            _candidate: &CoverCandidate<'_>,
        ) -> core_metadata::Result<Option<CoverId>> {
            Err(MetadataError::Bridge(BridgeError::OperationFailed("disk full".into())))
        }

        async fn open(&self, _id: &CoverId) -> core_metadata::Result<Option<Bytes>> {
            Ok(None)
        }
    }

    fn file() -> FileHandle {
        FileHandle::new("/music/Album/01 Song.mp3", "/music", 5, 100)
    }

    fn tagged_reader() -> MockReader {
        let mut reader = MockReader::new();
        reader.expect_read_tags().returning(|_| {
            let mut raw = RawTags::default();
            raw.push_id3v2("TIT2", "Song");
            raw.push_id3v2("TPE1", "Artist");
            raw.cover = Some(Bytes::from_static(b"jpeg"));
            Ok(raw)
        });
        reader
    }

    #[tokio::test]
    async fn test_extract_parses_tags_and_cover() {
        let covers = CoverSources::default().with(Arc::new(EmbeddedOnly));
        let extractor = Extractor::new(Arc::new(tagged_reader()), covers);

        let song = extractor.extract(file()).await.unwrap();
        assert_eq!(song.tags.name.as_deref(), Some("Song"));
        assert_eq!(song.tags.artist_names, ["Artist"]);
        assert_eq!(song.cover, Some(CoverId::Stored("4.img".into())));
        assert_eq!(song.uid(), song.tags.song_uid(&song.file));
    }

    #[tokio::test]
    async fn test_cover_failure_keeps_song() {
        let covers = CoverSources::default().with(Arc::new(Broken));
        let extractor = Extractor::new(Arc::new(tagged_reader()), covers);

        let song = extractor.extract(file()).await.unwrap();
        assert_eq!(song.cover, None);
    }

    #[tokio::test]
    async fn test_cover_storage_failure_fails_extraction() {
        let covers = CoverSources::default().with(Arc::new(Unavailable));
        let extractor = Extractor::new(Arc::new(tagged_reader()), covers);

        let result = extractor.extract(file()).await;
        assert!(matches!(result, Err(IndexError::CoverStorage(_))));
        assert!(!result.unwrap_err().is_file_failure());
    }

    #[tokio::test]
    async fn test_unreadable_file_fails() {
        let mut reader = MockReader::new();
        reader
            .expect_read_tags()
            .returning(|path| Err(BridgeError::NotFound(path.to_path_buf())));
        let extractor = Extractor::new(Arc::new(reader), CoverSources::default());

        let result = extractor.extract(file()).await;
        assert!(matches!(result, Err(IndexError::Bridge(_))));
    }

    #[tokio::test]
    async fn test_nameless_file_fails_with_missing_tag() {
        let mut reader = MockReader::new();
        reader.expect_read_tags().returning(|_| Ok(RawTags::default()));
        let extractor = Extractor::new(Arc::new(reader), CoverSources::default());

        let nameless = FileHandle::new("/music/   .mp3", "/music", 0, 0);
        let result = extractor.extract(nameless).await;
        assert!(matches!(
            result,
            Err(IndexError::Metadata(MetadataError::MissingRequiredTag { .. }))
        ));
    }
}
