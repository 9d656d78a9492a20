//! Playlist repository trait and implementation

use crate::error::{LibraryError, Result};
use crate::models::MusicUid;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, FromRow, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;

/// A persisted playlist: a name and an ordered list of song pointers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub uid: MusicUid,
    pub name: String,
    pub song_uids: Vec<MusicUid>,
    /// Unix timestamps in seconds
    pub created_at: i64,
    pub updated_at: i64,
}

impl PlaylistRecord {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Playlist name cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Playlist repository interface for data access operations
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// Insert a new playlist with its songs
    ///
    /// # Errors
    /// Returns error if:
    /// - A playlist with the same UID already exists
    /// - The name is blank
    async fn insert(&self, playlist: &PlaylistRecord) -> Result<()>;

    /// All playlists in creation order
    async fn find_all(&self) -> Result<Vec<PlaylistRecord>>;

    /// Find a playlist by UID
    async fn find(&self, uid: &MusicUid) -> Result<Option<PlaylistRecord>>;

    /// Rename a playlist
    ///
    /// # Errors
    /// Returns `NotFound` if the playlist does not exist
    async fn rename(&self, uid: &MusicUid, name: &str, updated_at: i64) -> Result<()>;

    /// Append songs after the existing ones
    async fn append_songs(&self, uid: &MusicUid, songs: &[MusicUid], updated_at: i64) -> Result<()>;

    /// Replace the whole song list
    async fn replace_songs(&self, uid: &MusicUid, songs: &[MusicUid], updated_at: i64) -> Result<()>;

    /// Delete a playlist and its song list
    ///
    /// # Returns
    /// - `Ok(true)` if the playlist was deleted
    /// - `Ok(false)` if it was not found
    async fn delete(&self, uid: &MusicUid) -> Result<bool>;
}

#[derive(FromRow)]
struct PlaylistRow {
    uid: String,
    name: String,
    created_at: i64,
    updated_at: i64,
}

/// SQLite implementation of PlaylistRepository
pub struct SqlitePlaylistRepository {
    pool: SqlitePool,
}

impl SqlitePlaylistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn touch(
        tx: &mut Transaction<'_, Sqlite>,
        uid: &MusicUid,
        updated_at: i64,
    ) -> Result<()> {
        let result = query("UPDATE playlists SET updated_at = ? WHERE uid = ?")
            .bind(updated_at)
            .bind(uid.to_string())
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(uid));
        }
        Ok(())
    }

    async fn insert_songs(
        tx: &mut Transaction<'_, Sqlite>,
        uid: &MusicUid,
        songs: &[MusicUid],
        first_position: i64,
    ) -> Result<()> {
        for (offset, song) in songs.iter().enumerate() {
            query("INSERT INTO playlist_songs (playlist_uid, position, song_uid) VALUES (?, ?, ?)")
                .bind(uid.to_string())
                .bind(first_position + offset as i64)
                .bind(song.to_string())
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    async fn song_uids(&self, uid: &str) -> Result<Vec<MusicUid>> {
        let rows = query_as::<_, (String,)>(
            "SELECT song_uid FROM playlist_songs WHERE playlist_uid = ? ORDER BY position ASC",
        )
        .bind(uid)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(song,)| song.parse::<MusicUid>().map_err(LibraryError::from))
            .collect()
    }
}

fn not_found(uid: &MusicUid) -> LibraryError {
    LibraryError::NotFound {
        entity_type: "Playlist".to_string(),
        id: uid.to_string(),
    }
}

#[async_trait]
impl PlaylistRepository for SqlitePlaylistRepository {
    async fn insert(&self, playlist: &PlaylistRecord) -> Result<()> {
        playlist
            .validate()
            .map_err(|e| LibraryError::InvalidInput {
                field: "Playlist".to_string(),
                message: e,
            })?;

        let mut tx = self.pool.begin().await?;

        query("INSERT INTO playlists (uid, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(playlist.uid.to_string())
            .bind(&playlist.name)
            .bind(playlist.created_at)
            .bind(playlist.updated_at)
            .execute(&mut *tx)
            .await?;

        Self::insert_songs(&mut tx, &playlist.uid, &playlist.song_uids, 0).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<PlaylistRecord>> {
        let rows = query_as::<_, PlaylistRow>(
            "SELECT uid, name, created_at, updated_at FROM playlists ORDER BY created_at ASC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let songs = query_as::<_, (String, String)>(
            "SELECT playlist_uid, song_uid FROM playlist_songs ORDER BY playlist_uid ASC, position ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut songs_by_playlist: HashMap<String, Vec<MusicUid>> = HashMap::new();
        for (playlist_uid, song_uid) in songs {
            songs_by_playlist
                .entry(playlist_uid)
                .or_default()
                .push(song_uid.parse::<MusicUid>()?);
        }

        rows.into_iter()
            .map(|row| -> Result<PlaylistRecord> {
                Ok(PlaylistRecord {
                    uid: row.uid.parse()?,
                    song_uids: songs_by_playlist.remove(&row.uid).unwrap_or_default(),
                    name: row.name,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                })
            })
            .collect()
    }

    async fn find(&self, uid: &MusicUid) -> Result<Option<PlaylistRecord>> {
        let row = query_as::<_, PlaylistRow>(
            "SELECT uid, name, created_at, updated_at FROM playlists WHERE uid = ?",
        )
        .bind(uid.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(PlaylistRecord {
            uid: *uid,
            song_uids: self.song_uids(&row.uid).await?,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    async fn rename(&self, uid: &MusicUid, name: &str, updated_at: i64) -> Result<()> {
        if name.trim().is_empty() {
            return Err(LibraryError::InvalidInput {
                field: "name".to_string(),
                message: "Playlist name cannot be empty".to_string(),
            });
        }

        let result = query("UPDATE playlists SET name = ?, updated_at = ? WHERE uid = ?")
            .bind(name)
            .bind(updated_at)
            .bind(uid.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(uid));
        }
        Ok(())
    }

    async fn append_songs(&self, uid: &MusicUid, songs: &[MusicUid], updated_at: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::touch(&mut tx, uid, updated_at).await?;

        let (next,): (i64,) = query_as(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM playlist_songs WHERE playlist_uid = ?",
        )
        .bind(uid.to_string())
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_songs(&mut tx, uid, songs, next).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn replace_songs(&self, uid: &MusicUid, songs: &[MusicUid], updated_at: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::touch(&mut tx, uid, updated_at).await?;

        query("DELETE FROM playlist_songs WHERE playlist_uid = ?")
            .bind(uid.to_string())
            .execute(&mut *tx)
            .await?;

        Self::insert_songs(&mut tx, uid, songs, 0).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, uid: &MusicUid) -> Result<bool> {
        // Songs go with it through ON DELETE CASCADE
        let result = query("DELETE FROM playlists WHERE uid = ?")
            .bind(uid.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::MusicKind;

    async fn setup_repo() -> SqlitePlaylistRepository {
        SqlitePlaylistRepository::new(create_test_pool().await.unwrap())
    }

    fn song(name: &str) -> MusicUid {
        MusicUid::hashed(MusicKind::Song, |h| {
            h.str(Some(name));
        })
    }

    fn record(name: &str, songs: &[&str], created_at: i64) -> PlaylistRecord {
        PlaylistRecord {
            uid: MusicUid::random(MusicKind::Playlist),
            name: name.to_string(),
            song_uids: songs.iter().map(|s| song(s)).collect(),
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_keeps_order() {
        let repo = setup_repo().await;
        let playlist = record("Road Trip", &["c", "a", "b"], 100);

        repo.insert(&playlist).await.unwrap();

        let found = repo.find(&playlist.uid).await.unwrap().unwrap();
        assert_eq!(found, playlist);
    }

    #[tokio::test]
    async fn test_find_all_in_creation_order() {
        let repo = setup_repo().await;
        let later = record("Later", &["x"], 200);
        let earlier = record("Earlier", &[], 100);
        repo.insert(&later).await.unwrap();
        repo.insert(&earlier).await.unwrap();

        let all = repo.find_all().await.unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Earlier", "Later"]);
        assert!(all[0].song_uids.is_empty());
        assert_eq!(all[1].song_uids, vec![song("x")]);
    }

    #[tokio::test]
    async fn test_rename() {
        let repo = setup_repo().await;
        let playlist = record("Old", &[], 1);
        repo.insert(&playlist).await.unwrap();

        repo.rename(&playlist.uid, "New", 2).await.unwrap();

        let found = repo.find(&playlist.uid).await.unwrap().unwrap();
        assert_eq!(found.name, "New");
        assert_eq!(found.updated_at, 2);
        assert!(repo.rename(&playlist.uid, "  ", 3).await.is_err());
    }

    #[tokio::test]
    async fn test_append_and_replace() {
        let repo = setup_repo().await;
        let playlist = record("Mix", &["a"], 1);
        repo.insert(&playlist).await.unwrap();

        repo.append_songs(&playlist.uid, &[song("b"), song("a")], 2)
            .await
            .unwrap();
        let found = repo.find(&playlist.uid).await.unwrap().unwrap();
        assert_eq!(found.song_uids, vec![song("a"), song("b"), song("a")]);

        repo.replace_songs(&playlist.uid, &[song("z")], 3).await.unwrap();
        let found = repo.find(&playlist.uid).await.unwrap().unwrap();
        assert_eq!(found.song_uids, vec![song("z")]);
        assert_eq!(found.updated_at, 3);
    }

    #[tokio::test]
    async fn test_edits_on_missing_playlist() {
        let repo = setup_repo().await;
        let missing = MusicUid::random(MusicKind::Playlist);

        assert!(matches!(
            repo.rename(&missing, "x", 1).await,
            Err(LibraryError::NotFound { .. })
        ));
        assert!(matches!(
            repo.append_songs(&missing, &[song("a")], 1).await,
            Err(LibraryError::NotFound { .. })
        ));
        assert!(!repo.delete(&missing).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_cascades_songs() {
        let repo = setup_repo().await;
        let playlist = record("Gone", &["a", "b"], 1);
        repo.insert(&playlist).await.unwrap();

        assert!(repo.delete(&playlist.uid).await.unwrap());
        assert!(repo.find(&playlist.uid).await.unwrap().is_none());

        let (orphans,): (i64,) = query_as("SELECT COUNT(*) FROM playlist_songs")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let repo = setup_repo().await;
        let playlist = record("   ", &[], 1);
        assert!(matches!(
            repo.insert(&playlist).await,
            Err(LibraryError::InvalidInput { .. })
        ));
    }
}
