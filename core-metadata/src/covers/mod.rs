//! # Cover Sources
//!
//! Covers are found by an ordered chain of [`CoverSource`]s. Each source owns
//! a disjoint [`CoverId`] space, so both lookups stop at the first hit:
//!
//! - `identify` runs during indexing and decides which cover a song gets
//! - `open` runs when a cover is rendered and returns its bytes
//!
//! The default chain is the embedded-art [`CoverCache`] followed by
//! [`FolderCoverSource`].

pub mod folder;
pub mod store;
pub mod transcoding;

pub use folder::FolderCoverSource;
pub use store::{CoverCache, StoredBlob};

use async_trait::async_trait;
use bytes::Bytes;
use core_library::models::{CoverId, FileHandle, MusicUid};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// What a source gets to look at when identifying a song's cover.
#[derive(Debug, Clone, Copy)]
pub struct CoverCandidate<'a> {
    pub file: &'a FileHandle,
    pub song_uid: MusicUid,
    /// Cover bytes embedded in the file's tags
    pub embedded: Option<&'a Bytes>,
}

#[async_trait]
pub trait CoverSource: Send + Sync {
    /// Find the cover of the song described by `candidate`.
    ///
    /// `Ok(None)` lets the next source try.
    async fn identify(&self, candidate: &CoverCandidate<'_>) -> Result<Option<CoverId>>;

    /// Bytes of a cover this source identified.
    ///
    /// `Ok(None)` when `id` belongs to another source or no longer exists.
    async fn open(&self, id: &CoverId) -> Result<Option<Bytes>>;
}

/// Ordered chain of cover sources; the first hit wins.
#[derive(Clone, Default)]
pub struct CoverSources {
    sources: Vec<Arc<dyn CoverSource>>,
}

impl CoverSources {
    pub fn new(sources: Vec<Arc<dyn CoverSource>>) -> Self {
        Self { sources }
    }

    /// Append a source, tried after every source already in the chain
    pub fn with(mut self, source: Arc<dyn CoverSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub async fn identify(&self, candidate: &CoverCandidate<'_>) -> Result<Option<CoverId>> {
        for source in &self.sources {
            if let Some(id) = source.identify(candidate).await? {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    pub async fn open(&self, id: &CoverId) -> Result<Option<Bytes>> {
        for source in &self.sources {
            if let Some(data) = source.open(id).await? {
                return Ok(Some(data));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for CoverSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverSources")
            .field("sources", &self.sources.len())
            .finish()
    }
}
