//! Content-addressed cover store
//!
//! Embedded covers are stored once per distinct content under an ID derived
//! from a SHA-256 digest of the raw bytes, so every song sharing the same
//! art shares one blob. A mapping table records which blob each song version
//! uses.

use async_trait::async_trait;
use bridge_traits::FileSystemAccess;
use bytes::Bytes;
use core_library::models::{CoverId, MusicUid, SingleCover};
use core_library::repositories::{StoredCover, StoredCoverRepository};
use core_runtime::config::CoverTranscoding;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use super::{transcoding, CoverCandidate, CoverSource};
use crate::error::{MetadataError, Result};

/// Number of blobs kept in memory by default
pub const DEFAULT_BLOB_CACHE_CAPACITY: usize = 64;

/// A blob as stored in the cover directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub cover_id: String,
    /// Bytes as stored, after transcoding
    pub data: Bytes,
}

/// Content-addressed cover blob store.
#[derive(Clone)]
pub struct CoverCache {
    file_system: Arc<dyn FileSystemAccess>,
    repository: Arc<dyn StoredCoverRepository>,
    cover_dir: PathBuf,
    transcoding: CoverTranscoding,
    /// LRU cache for blob reads
    blobs: Arc<RwLock<LruCache<String, Bytes>>>,
    /// Serializes blob writes and cleanup so two writers never share a
    /// temporary file
    writes: Arc<Mutex<()>>,
}

impl CoverCache {
    pub fn new(
        file_system: Arc<dyn FileSystemAccess>,
        repository: Arc<dyn StoredCoverRepository>,
        cover_dir: impl Into<PathBuf>,
        transcoding: CoverTranscoding,
    ) -> Self {
        Self::with_capacity(
            file_system,
            repository,
            cover_dir,
            transcoding,
            DEFAULT_BLOB_CACHE_CAPACITY,
        )
    }

    /// Create a store that keeps up to `capacity` blobs in memory
    pub fn with_capacity(
        file_system: Arc<dyn FileSystemAccess>,
        repository: Arc<dyn StoredCoverRepository>,
        cover_dir: impl Into<PathBuf>,
        transcoding: CoverTranscoding,
        capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            file_system,
            repository,
            cover_dir: cover_dir.into(),
            transcoding,
            blobs: Arc::new(RwLock::new(LruCache::new(capacity))),
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Content ID the given raw cover bytes are stored under.
    ///
    /// # Errors
    ///
    /// [`MetadataError::IdentifyFailure`] when there is nothing to hash.
    pub fn content_id(&self, data: &[u8]) -> Result<String> {
        if data.is_empty() {
            return Err(MetadataError::IdentifyFailure(
                "Cover data is empty".to_string(),
            ));
        }
        Ok(format!(
            "{}{}",
            calculate_hash(data),
            transcoding::suffix(&self.transcoding)
        ))
    }

    /// Store `data` as the cover of one song version.
    ///
    /// The blob is only written when no blob with the same content ID exists.
    /// The song version → blob mapping is upserted every time.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn write(
        &self,
        song_uid: MusicUid,
        last_modified: i64,
        data: &[u8],
    ) -> Result<StoredBlob> {
        let cover_id = self.content_id(data)?;
        let stored = self.store_blob(&cover_id, data).await?;

        self.repository
            .upsert(&StoredCover {
                cover_id: cover_id.clone(),
                song_uid,
                last_modified,
            })
            .await?;

        Ok(StoredBlob {
            cover_id,
            data: stored,
        })
    }

    /// Stored bytes for a song version's cover, if one was written.
    pub async fn read(&self, cover: &SingleCover) -> Result<Option<Bytes>> {
        let Some(cover_id) = self
            .repository
            .find_cover_id(&cover.song_uid, cover.last_modified)
            .await?
        else {
            return Ok(None);
        };
        self.read_blob(&cover_id).await
    }

    /// Stored bytes for a content ID.
    pub async fn read_blob(&self, cover_id: &str) -> Result<Option<Bytes>> {
        if let Some(data) = self.cached(cover_id).await {
            debug!("Cover {} found in cache", cover_id);
            return Ok(Some(data));
        }

        let path = self.cover_dir.join(cover_id);
        if !self.file_system.exists(&path).await? {
            return Ok(None);
        }

        let data = self.file_system.read_file(&path).await?;
        self.remember(cover_id, data.clone()).await;
        Ok(Some(data))
    }

    /// Remove every mapping and blob whose content ID is not in `excluding`.
    ///
    /// # Returns
    /// Number of blobs deleted
    #[instrument(skip(self, excluding), fields(keep = excluding.len()))]
    pub async fn cleanup(&self, excluding: &HashSet<String>) -> Result<usize> {
        let _guard = self.writes.lock().await;

        let released = self.repository.delete_excluding(excluding).await?;
        debug!(count = released.len(), "Released cover mappings");

        if !self.file_system.exists(&self.cover_dir).await? {
            return Ok(0);
        }

        let mut removed = 0;
        for path in self.file_system.list_directory(&self.cover_dir).await? {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if excluding.contains(name) {
                continue;
            }
            self.file_system.delete_file(&path).await?;
            self.blobs.write().await.pop(name);
            removed += 1;
        }

        info!(removed, "Cleaned up cover blobs");
        Ok(removed)
    }

    async fn store_blob(&self, cover_id: &str, data: &[u8]) -> Result<Bytes> {
        if let Some(cached) = self.cached(cover_id).await {
            return Ok(cached);
        }

        let _guard = self.writes.lock().await;
        let path = self.cover_dir.join(cover_id);

        let stored = if self.file_system.exists(&path).await? {
            debug!("Cover {} already stored", cover_id);
            self.file_system.read_file(&path).await?
        } else {
            let raw = data.to_vec();
            let settings = self.transcoding;
            let encoded =
                tokio::task::spawn_blocking(move || transcoding::transcode(&raw, settings))
                    .await
                    .map_err(|e| {
                        MetadataError::ImageError(format!("Transcoding task failed: {}", e))
                    })??;

            self.file_system.create_dir_all(&self.cover_dir).await?;
            let tmp = self.cover_dir.join(format!("{}.tmp", cover_id));
            self.file_system.write_file(&tmp, encoded.clone()).await?;
            self.file_system.rename(&tmp, &path).await?;

            info!("Stored new cover {} ({} bytes)", cover_id, encoded.len());
            encoded
        };

        self.remember(cover_id, stored.clone()).await;
        Ok(stored)
    }

    async fn cached(&self, cover_id: &str) -> Option<Bytes> {
        self.blobs.write().await.get(cover_id).cloned()
    }

    async fn remember(&self, cover_id: &str, data: Bytes) {
        self.blobs.write().await.put(cover_id.to_string(), data);
    }
}

/// Embedded covers: stored on identify, opened by content ID
#[async_trait]
impl CoverSource for CoverCache {
    async fn identify(&self, candidate: &CoverCandidate<'_>) -> Result<Option<CoverId>> {
        let Some(embedded) = candidate.embedded else {
            return Ok(None);
        };
        let blob = self
            .write(candidate.song_uid, candidate.file.last_modified, embedded)
            .await?;
        Ok(Some(CoverId::Stored(blob.cover_id)))
    }

    async fn open(&self, id: &CoverId) -> Result<Option<Bytes>> {
        match id {
            CoverId::Stored(cover_id) => self.read_blob(cover_id).await,
            CoverId::Folder(_) => Ok(None),
        }
    }
}

/// Calculate SHA-256 hash of cover data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
