//! # Tag Cache Stage
//!
//! Splits explored files into cache hits, whose tags were parsed on an
//! earlier run, and misses that need extraction. Freshly extracted songs are
//! written back so the next run can skip them.
//!
//! Entries are keyed by `(path, last_modified)`. A touched file never hits,
//! and entries for deleted files are left in place.

use core_library::models::FileHandle;
use core_library::repositories::{CachedTags, TagCacheRepository};
use std::sync::Arc;
use tracing::trace;

use crate::error::Result;
use crate::extract::RawSong;

#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult {
    /// Tags parsed from this exact file version on an earlier run
    Hit(RawSong),
    /// The file is new or was modified since it was cached
    Miss(FileHandle),
}

pub struct TagCache {
    repository: Arc<dyn TagCacheRepository>,
}

impl TagCache {
    pub fn new(repository: Arc<dyn TagCacheRepository>) -> Self {
        Self { repository }
    }

    pub async fn read(&self, file: FileHandle) -> Result<CacheResult> {
        match self.repository.find(&file).await? {
            Some(CachedTags { tags, cover }) => {
                trace!(path = %file.path.display(), "Tag cache hit");
                Ok(CacheResult::Hit(RawSong { file, tags, cover }))
            }
            None => Ok(CacheResult::Miss(file)),
        }
    }

    /// Persist a freshly extracted song. Writing the same version twice
    /// leaves a single entry.
    pub async fn write(&self, song: &RawSong) -> Result<()> {
        self.repository
            .upsert(
                &song.file,
                &CachedTags {
                    tags: song.tags.clone(),
                    cover: song.cover.clone(),
                },
            )
            .await?;
        Ok(())
    }
}
