//! Stored cover mapping repository

use crate::error::Result;
use crate::models::MusicUid;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, SqlitePool};
use std::collections::HashSet;

/// Maps one song version to a content-addressed blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCover {
    pub cover_id: String,
    pub song_uid: MusicUid,
    pub last_modified: i64,
}

#[async_trait]
pub trait StoredCoverRepository: Send + Sync {
    /// Content ID stored for this song version, if any
    async fn find_cover_id(&self, song_uid: &MusicUid, last_modified: i64) -> Result<Option<String>>;

    /// Insert or replace the mapping for `cover.song_uid` at `cover.last_modified`
    async fn upsert(&self, cover: &StoredCover) -> Result<()>;

    /// Every distinct content ID that is still mapped
    async fn cover_ids(&self) -> Result<Vec<String>>;

    /// Remove mappings whose content ID is not in `keep`
    ///
    /// # Returns
    /// The distinct content IDs that lost all their mappings
    async fn delete_excluding(&self, keep: &HashSet<String>) -> Result<Vec<String>>;
}

pub struct SqliteStoredCoverRepository {
    pool: SqlitePool,
}

impl SqliteStoredCoverRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoredCoverRepository for SqliteStoredCoverRepository {
    async fn find_cover_id(&self, song_uid: &MusicUid, last_modified: i64) -> Result<Option<String>> {
        let cover_id = query_as::<_, (String,)>(
            "SELECT cover_id FROM stored_covers WHERE song_uid = ? AND last_modified = ?",
        )
        .bind(song_uid.to_string())
        .bind(last_modified)
        .fetch_optional(&self.pool)
        .await?
        .map(|(id,)| id);

        Ok(cover_id)
    }

    async fn upsert(&self, cover: &StoredCover) -> Result<()> {
        query(
            r#"
            INSERT OR REPLACE INTO stored_covers (song_uid, last_modified, cover_id)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(cover.song_uid.to_string())
        .bind(cover.last_modified)
        .bind(&cover.cover_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn cover_ids(&self) -> Result<Vec<String>> {
        let ids = query_as::<_, (String,)>(
            "SELECT DISTINCT cover_id FROM stored_covers ORDER BY cover_id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map(|rows| rows.into_iter().map(|(id,)| id).collect())?;

        Ok(ids)
    }

    async fn delete_excluding(&self, keep: &HashSet<String>) -> Result<Vec<String>> {
        let mut tx = self.pool.begin().await?;

        let stale: Vec<String> = query_as::<_, (String,)>(
            "SELECT DISTINCT cover_id FROM stored_covers ORDER BY cover_id ASC",
        )
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|(id,)| id)
        .filter(|id| !keep.contains(id))
        .collect();

        for id in &stale {
            query("DELETE FROM stored_covers WHERE cover_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(stale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::MusicKind;

    fn stored(song: &str, last_modified: i64, cover_id: &str) -> StoredCover {
        StoredCover {
            cover_id: cover_id.to_string(),
            song_uid: MusicUid::hashed(MusicKind::Song, |h| {
                h.str(Some(song));
            }),
            last_modified,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_find() {
        let repo = SqliteStoredCoverRepository::new(create_test_pool().await.unwrap());
        let cover = stored("Windowlicker", 10, "aaa.img");

        repo.upsert(&cover).await.unwrap();

        let found = repo.find_cover_id(&cover.song_uid, 10).await.unwrap();
        assert_eq!(found.as_deref(), Some("aaa.img"));
        assert!(repo.find_cover_id(&cover.song_uid, 11).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let repo = SqliteStoredCoverRepository::new(create_test_pool().await.unwrap());

        repo.upsert(&stored("Xtal", 1, "old.img")).await.unwrap();
        repo.upsert(&stored("Xtal", 1, "new.img")).await.unwrap();

        let uid = stored("Xtal", 1, "").song_uid;
        assert_eq!(repo.find_cover_id(&uid, 1).await.unwrap().as_deref(), Some("new.img"));
        assert_eq!(repo.cover_ids().await.unwrap(), vec!["new.img".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_excluding() {
        let repo = SqliteStoredCoverRepository::new(create_test_pool().await.unwrap());
        repo.upsert(&stored("a", 1, "shared.img")).await.unwrap();
        repo.upsert(&stored("b", 1, "shared.img")).await.unwrap();
        repo.upsert(&stored("c", 1, "orphan.img")).await.unwrap();

        let keep: HashSet<String> = ["shared.img".to_string()].into_iter().collect();
        let removed = repo.delete_excluding(&keep).await.unwrap();

        assert_eq!(removed, vec!["orphan.img".to_string()]);
        assert_eq!(repo.cover_ids().await.unwrap(), vec!["shared.img".to_string()]);
    }
}
