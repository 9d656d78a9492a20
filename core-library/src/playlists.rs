//! # Stored Playlists
//!
//! Reads persisted playlists into [`PlaylistFile`]s and hands out
//! [`PlaylistHandle`]s that edit the stored record directly. Edits are not
//! buffered; a caller that needs several edits to land together has to
//! coordinate them itself.

use crate::error::{LibraryError, Result};
use crate::models::{MusicKind, MusicUid};
use crate::repositories::{PlaylistRecord, PlaylistRepository};
use async_trait::async_trait;
use bridge_traits::time::Clock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Editable reference to one persisted playlist.
#[async_trait]
pub trait PlaylistHandle: Send + Sync {
    fn uid(&self) -> MusicUid;

    async fn rename(&self, name: &str) -> Result<()>;

    /// Append songs to the end of the playlist
    async fn add(&self, songs: &[MusicUid]) -> Result<()>;

    /// Replace the playlist's songs
    async fn rewrite(&self, songs: &[MusicUid]) -> Result<()>;

    async fn delete(&self) -> Result<()>;
}

/// A playlist as read from storage, before its songs are resolved.
#[derive(Clone)]
pub struct PlaylistFile {
    pub uid: MusicUid,
    pub name: String,
    /// Song pointers in playlist order. Some may no longer exist.
    pub song_uids: Vec<MusicUid>,
    pub handle: Arc<dyn PlaylistHandle>,
}

impl fmt::Debug for PlaylistFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaylistFile")
            .field("uid", &self.uid)
            .field("name", &self.name)
            .field("song_uids", &self.song_uids)
            .finish_non_exhaustive()
    }
}

struct StoredPlaylistHandle {
    uid: MusicUid,
    repository: Arc<dyn PlaylistRepository>,
    clock: Arc<dyn Clock>,
}

#[async_trait]
impl PlaylistHandle for StoredPlaylistHandle {
    fn uid(&self) -> MusicUid {
        self.uid
    }

    async fn rename(&self, name: &str) -> Result<()> {
        debug!(playlist = %self.uid, "Renaming playlist");
        self.repository
            .rename(&self.uid, name, self.clock.unix_timestamp())
            .await
    }

    async fn add(&self, songs: &[MusicUid]) -> Result<()> {
        debug!(playlist = %self.uid, count = songs.len(), "Adding songs to playlist");
        self.repository
            .append_songs(&self.uid, songs, self.clock.unix_timestamp())
            .await
    }

    async fn rewrite(&self, songs: &[MusicUid]) -> Result<()> {
        debug!(playlist = %self.uid, count = songs.len(), "Rewriting playlist");
        self.repository
            .replace_songs(&self.uid, songs, self.clock.unix_timestamp())
            .await
    }

    async fn delete(&self) -> Result<()> {
        debug!(playlist = %self.uid, "Deleting playlist");
        if !self.repository.delete(&self.uid).await? {
            return Err(LibraryError::NotFound {
                entity_type: "Playlist".to_string(),
                id: self.uid.to_string(),
            });
        }
        Ok(())
    }
}

/// Playlists persisted in the library database.
#[derive(Clone)]
pub struct StoredPlaylists {
    repository: Arc<dyn PlaylistRepository>,
    clock: Arc<dyn Clock>,
}

impl StoredPlaylists {
    pub fn new(repository: Arc<dyn PlaylistRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Handle for the playlist with `uid`. The playlist is not checked for
    /// existence until an edit is made.
    pub fn handle(&self, uid: MusicUid) -> Arc<dyn PlaylistHandle> {
        Arc::new(StoredPlaylistHandle {
            uid,
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        })
    }

    fn file(&self, record: PlaylistRecord) -> PlaylistFile {
        PlaylistFile {
            handle: self.handle(record.uid),
            uid: record.uid,
            name: record.name,
            song_uids: record.song_uids,
        }
    }

    /// Every stored playlist, in creation order
    #[instrument(skip(self))]
    pub async fn read(&self) -> Result<Vec<PlaylistFile>> {
        let records = self.repository.find_all().await?;
        info!(count = records.len(), "Read stored playlists");
        Ok(records.into_iter().map(|record| self.file(record)).collect())
    }

    /// Persist a new playlist
    #[instrument(skip(self, songs), fields(count = songs.len()))]
    pub async fn create(&self, name: &str, songs: &[MusicUid]) -> Result<PlaylistFile> {
        let now = self.clock.unix_timestamp();
        let record = PlaylistRecord {
            uid: MusicUid::random(MusicKind::Playlist),
            name: name.trim().to_string(),
            song_uids: songs.to_vec(),
            created_at: now,
            updated_at: now,
        };

        self.repository.insert(&record).await?;
        info!(playlist = %record.uid, "Created playlist");
        Ok(self.file(record))
    }
}

impl fmt::Debug for StoredPlaylists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredPlaylists").finish_non_exhaustive()
    }
}
