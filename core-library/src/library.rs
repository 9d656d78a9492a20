//! # Library
//!
//! The finished aggregate of one indexing run. Entities live in per-kind
//! vectors with UID indexes; a `Library` is never mutated. Playlist edits go
//! through the stored [`PlaylistHandle`] and return a new `Library` that
//! shares the song/album/artist/genre catalog with the old one.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::entities::{Album, Artist, Genre, Playlist, Song};
use crate::error::{LibraryError, Result};
use crate::models::{CoverId, MusicUid};
use crate::playlists::{PlaylistFile, PlaylistHandle, StoredPlaylists};

struct Catalog {
    songs: Vec<Song>,
    albums: Vec<Album>,
    artists: Vec<Artist>,
    genres: Vec<Genre>,
    song_index: HashMap<MusicUid, usize>,
    album_index: HashMap<MusicUid, usize>,
    artist_index: HashMap<MusicUid, usize>,
    genre_index: HashMap<MusicUid, usize>,
    path_index: HashMap<PathBuf, usize>,
}

fn index_by<T>(items: &[T], uid: impl Fn(&T) -> MusicUid) -> HashMap<MusicUid, usize> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| (uid(item), i))
        .collect()
}

impl Catalog {
    fn new(songs: Vec<Song>, albums: Vec<Album>, artists: Vec<Artist>, genres: Vec<Genre>) -> Self {
        Self {
            song_index: index_by(&songs, |s| s.uid),
            album_index: index_by(&albums, |a| a.uid),
            artist_index: index_by(&artists, |a| a.uid),
            genre_index: index_by(&genres, |g| g.uid),
            path_index: songs
                .iter()
                .enumerate()
                .map(|(i, s)| (s.path.clone(), i))
                .collect(),
            songs,
            albums,
            artists,
            genres,
        }
    }

    fn song(&self, uid: &MusicUid) -> Option<&Song> {
        self.song_index.get(uid).map(|&i| &self.songs[i])
    }

    /// Keeps the pointers that resolve, in order
    fn resolve_songs(&self, uids: &[MusicUid]) -> Vec<MusicUid> {
        uids.iter()
            .filter(|uid| self.song_index.contains_key(uid))
            .copied()
            .collect()
    }

    fn duration_of(&self, uids: &[MusicUid]) -> u64 {
        uids.iter()
            .filter_map(|uid| self.song(uid))
            .map(|song| song.duration_ms)
            .sum()
    }

    fn playlist(&self, uid: MusicUid, name: String, song_uids: &[MusicUid]) -> Playlist {
        let songs = self.resolve_songs(song_uids);
        Playlist {
            duration_ms: self.duration_of(&songs),
            uid,
            name,
            songs,
        }
    }
}

#[derive(Clone)]
pub struct Library {
    catalog: Arc<Catalog>,
    playlists: Vec<Playlist>,
    handles: HashMap<MusicUid, Arc<dyn PlaylistHandle>>,
}

impl Library {
    /// Assemble a library, resolving each playlist against `songs`.
    ///
    /// Playlist song pointers that do not match a song are dropped without
    /// error; the remaining songs keep their playlist order.
    pub fn new(
        songs: Vec<Song>,
        albums: Vec<Album>,
        artists: Vec<Artist>,
        genres: Vec<Genre>,
        playlist_files: Vec<PlaylistFile>,
    ) -> Self {
        let catalog = Catalog::new(songs, albums, artists, genres);

        let mut playlists = Vec::with_capacity(playlist_files.len());
        let mut handles = HashMap::with_capacity(playlist_files.len());
        for file in playlist_files {
            let playlist = catalog.playlist(file.uid, file.name, &file.song_uids);
            if playlist.songs.len() < file.song_uids.len() {
                debug!(
                    playlist = %file.uid,
                    dropped = file.song_uids.len() - playlist.songs.len(),
                    "Dropped playlist songs missing from the library"
                );
            }
            handles.insert(file.uid, file.handle);
            playlists.push(playlist);
        }

        Self {
            catalog: Arc::new(catalog),
            playlists,
            handles,
        }
    }

    pub fn songs(&self) -> &[Song] {
        &self.catalog.songs
    }

    pub fn albums(&self) -> &[Album] {
        &self.catalog.albums
    }

    pub fn artists(&self) -> &[Artist] {
        &self.catalog.artists
    }

    pub fn genres(&self) -> &[Genre] {
        &self.catalog.genres
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn find_song(&self, uid: &MusicUid) -> Option<&Song> {
        self.catalog.song(uid)
    }

    pub fn find_album(&self, uid: &MusicUid) -> Option<&Album> {
        self.catalog
            .album_index
            .get(uid)
            .map(|&i| &self.catalog.albums[i])
    }

    pub fn find_artist(&self, uid: &MusicUid) -> Option<&Artist> {
        self.catalog
            .artist_index
            .get(uid)
            .map(|&i| &self.catalog.artists[i])
    }

    pub fn find_genre(&self, uid: &MusicUid) -> Option<&Genre> {
        self.catalog
            .genre_index
            .get(uid)
            .map(|&i| &self.catalog.genres[i])
    }

    pub fn find_playlist(&self, uid: &MusicUid) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.uid == *uid)
    }

    pub fn find_song_by_path(&self, path: &Path) -> Option<&Song> {
        self.catalog
            .path_index
            .get(path)
            .map(|&i| &self.catalog.songs[i])
    }

    /// Songs for `uids`, skipping any that are not in the library
    pub fn resolve_songs<'a>(&'a self, uids: &'a [MusicUid]) -> impl Iterator<Item = &'a Song> + 'a {
        uids.iter().filter_map(|uid| self.find_song(uid))
    }

    /// Content IDs of the stored covers this library's songs use
    pub fn stored_cover_ids(&self) -> HashSet<String> {
        self.catalog
            .songs
            .iter()
            .filter_map(|song| match song.cover.as_ref().map(|c| &c.id) {
                Some(CoverId::Stored(id)) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    fn handle(&self, uid: &MusicUid) -> Result<&Arc<dyn PlaylistHandle>> {
        self.handles.get(uid).ok_or_else(|| LibraryError::NotFound {
            entity_type: "Playlist".to_string(),
            id: uid.to_string(),
        })
    }

    fn with_playlists(&self, playlists: Vec<Playlist>, handles: HashMap<MusicUid, Arc<dyn PlaylistHandle>>) -> Library {
        Library {
            catalog: Arc::clone(&self.catalog),
            playlists,
            handles,
        }
    }

    fn replace_playlist(&self, updated: Playlist) -> Library {
        let playlists = self
            .playlists
            .iter()
            .map(|p| if p.uid == updated.uid { updated.clone() } else { p.clone() })
            .collect();
        self.with_playlists(playlists, self.handles.clone())
    }

    fn existing(&self, uid: &MusicUid) -> Result<&Playlist> {
        self.find_playlist(uid).ok_or_else(|| LibraryError::NotFound {
            entity_type: "Playlist".to_string(),
            id: uid.to_string(),
        })
    }

    /// Persist a new playlist and return a library that contains it
    #[instrument(skip(self, storage, songs), fields(count = songs.len()))]
    pub async fn create_playlist(
        &self,
        storage: &StoredPlaylists,
        name: &str,
        songs: &[MusicUid],
    ) -> Result<Library> {
        let file = storage.create(name, songs).await?;

        let mut playlists = self.playlists.clone();
        playlists.push(self.catalog.playlist(file.uid, file.name, &file.song_uids));
        let mut handles = self.handles.clone();
        handles.insert(file.uid, file.handle);

        Ok(self.with_playlists(playlists, handles))
    }

    #[instrument(skip(self))]
    pub async fn rename_playlist(&self, uid: &MusicUid, name: &str) -> Result<Library> {
        let current = self.existing(uid)?;
        self.handle(uid)?.rename(name).await?;

        Ok(self.replace_playlist(Playlist {
            name: name.to_string(),
            ..current.clone()
        }))
    }

    /// Append songs to a playlist
    #[instrument(skip(self, songs), fields(count = songs.len()))]
    pub async fn add_to_playlist(&self, uid: &MusicUid, songs: &[MusicUid]) -> Result<Library> {
        let current = self.existing(uid)?;
        self.handle(uid)?.add(songs).await?;

        let mut all = current.songs.clone();
        all.extend_from_slice(songs);
        Ok(self.replace_playlist(self.catalog.playlist(*uid, current.name.clone(), &all)))
    }

    /// Replace a playlist's songs
    #[instrument(skip(self, songs), fields(count = songs.len()))]
    pub async fn rewrite_playlist(&self, uid: &MusicUid, songs: &[MusicUid]) -> Result<Library> {
        let current = self.existing(uid)?;
        self.handle(uid)?.rewrite(songs).await?;

        Ok(self.replace_playlist(self.catalog.playlist(*uid, current.name.clone(), songs)))
    }

    #[instrument(skip(self))]
    pub async fn delete_playlist(&self, uid: &MusicUid) -> Result<Library> {
        self.existing(uid)?;
        self.handle(uid)?.delete().await?;

        let playlists = self
            .playlists
            .iter()
            .filter(|p| p.uid != *uid)
            .cloned()
            .collect();
        let mut handles = self.handles.clone();
        handles.remove(uid);
        Ok(self.with_playlists(playlists, handles))
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("songs", &self.catalog.songs.len())
            .field("albums", &self.catalog.albums.len())
            .field("artists", &self.catalog.artists.len())
            .field("genres", &self.catalog.genres.len())
            .field("playlists", &self.playlists.len())
            .finish()
    }
}
