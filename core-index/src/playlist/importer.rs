use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use core_library::{Library, Playlist, StoredPlaylists};
use core_runtime::events::{CoreEvent, EventBus, PlaylistEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::m3u::{self, ImportedPlaylist};
use crate::error::Result;

/// Moves playlists between M3U files and the library.
pub struct PlaylistImporter {
    file_system: Arc<dyn FileSystemAccess>,
    event_bus: EventBus,
}

impl PlaylistImporter {
    pub fn new(file_system: Arc<dyn FileSystemAccess>, event_bus: EventBus) -> Self {
        Self {
            file_system,
            event_bus,
        }
    }

    /// Read the playlist file at `path`. Relative entries resolve against
    /// the file's directory.
    #[instrument(skip(self))]
    pub async fn import(&self, path: &Path) -> Result<Option<ImportedPlaylist>> {
        let data = self.file_system.read_file(path).await?;
        let text = String::from_utf8_lossy(&data);
        let working_dir = path.parent().unwrap_or_else(|| Path::new("/"));

        let Some(playlist) = m3u::read(&text, working_dir) else {
            warn!(path = %path.display(), "Playlist has no entries");
            return Ok(None);
        };

        info!(entries = playlist.paths.len(), "Imported playlist");
        self.event_bus
            .emit(CoreEvent::Playlist(PlaylistEvent::Imported {
                path: path.to_path_buf(),
                name: playlist.name.clone(),
                entries: playlist.paths.len() as u64,
            }))
            .ok();
        Ok(Some(playlist))
    }

    /// Import `path` as a new stored playlist and return the library that
    /// contains it. The playlist is named after its `#PLAYLIST` entry, or the
    /// file name when it has none.
    #[instrument(skip(self, library, storage))]
    pub async fn import_into(
        &self,
        path: &Path,
        library: &Library,
        storage: &StoredPlaylists,
    ) -> Result<Option<Library>> {
        let Some(imported) = self.import(path).await? else {
            return Ok(None);
        };

        let name = imported
            .name
            .clone()
            .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_default();
        let songs = imported.resolve(library);
        let updated = library.create_playlist(storage, &name, &songs).await?;
        Ok(Some(updated))
    }

    /// Write `playlist` to `path` as extended M3U, with song paths relative
    /// to the file's directory.
    #[instrument(skip(self, playlist, library), fields(playlist = %playlist.uid))]
    pub async fn export(&self, playlist: &Playlist, library: &Library, path: &Path) -> Result<()> {
        let working_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("/"));
        if !self.file_system.exists(&working_dir).await? {
            self.file_system.create_dir_all(&working_dir).await?;
        }

        let text = m3u::write(playlist, library, &working_dir);
        self.file_system
            .write_file(path, Bytes::from(text.into_bytes()))
            .await?;

        let entries = library.resolve_songs(&playlist.songs).count() as u64;
        info!(entries, "Exported playlist");
        self.event_bus
            .emit(CoreEvent::Playlist(PlaylistEvent::Exported {
                path: path.to_path_buf(),
                entries,
            }))
            .ok();
        Ok(())
    }
}
