//! Tag cache repository trait and implementation

use crate::error::Result;
use crate::models::{CoverId, FileHandle, ParsedTags};
use async_trait::async_trait;
use sqlx::{query, query_as, FromRow, SqlitePool};

/// What the cache remembers about one file version.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedTags {
    pub tags: ParsedTags,
    pub cover: Option<CoverId>,
}

/// Tag cache keyed by `(path, last_modified)`
#[async_trait]
pub trait TagCacheRepository: Send + Sync {
    /// Find the tags stored for this exact file version
    ///
    /// # Returns
    /// - `Ok(Some(tags))` if the path was cached with the same modification time
    /// - `Ok(None)` otherwise, including when the file was touched since
    async fn find(&self, file: &FileHandle) -> Result<Option<CachedTags>>;

    /// Insert or replace the entry for this file version
    async fn upsert(&self, file: &FileHandle, entry: &CachedTags) -> Result<()>;

    /// Count cached file versions
    async fn count(&self) -> Result<i64>;
}

#[derive(FromRow)]
struct TagCacheRow {
    tags: String,
    cover_id: Option<String>,
}

/// SQLite implementation of TagCacheRepository
pub struct SqliteTagCacheRepository {
    pool: SqlitePool,
}

impl SqliteTagCacheRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn path_key(file: &FileHandle) -> String {
    file.path.to_string_lossy().into_owned()
}

#[async_trait]
impl TagCacheRepository for SqliteTagCacheRepository {
    async fn find(&self, file: &FileHandle) -> Result<Option<CachedTags>> {
        let row = query_as::<_, TagCacheRow>(
            "SELECT tags, cover_id FROM tag_cache WHERE path = ? AND last_modified = ?",
        )
        .bind(path_key(file))
        .bind(file.last_modified)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        // A cover ID from an unknown source is treated like no cover rather
        // than failing the whole entry.
        Ok(Some(CachedTags {
            tags: serde_json::from_str(&row.tags)?,
            cover: row.cover_id.and_then(|id| id.parse().ok()),
        }))
    }

    async fn upsert(&self, file: &FileHandle, entry: &CachedTags) -> Result<()> {
        let tags = serde_json::to_string(&entry.tags)?;

        query(
            r#"
            INSERT OR REPLACE INTO tag_cache (path, last_modified, size, tags, cover_id, cached_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(path_key(file))
        .bind(file.last_modified)
        .bind(file.size as i64)
        .bind(tags)
        .bind(entry.cover.as_ref().map(|id| id.to_string()))
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_as("SELECT COUNT(*) as count FROM tag_cache")
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    async fn setup_repo() -> SqliteTagCacheRepository {
        SqliteTagCacheRepository::new(create_test_pool().await.unwrap())
    }

    fn entry(name: &str) -> CachedTags {
        CachedTags {
            tags: ParsedTags {
                name: Some(name.to_string()),
                artist_names: vec!["Boards of Canada".to_string()],
                duration_ms: 321_000,
                ..Default::default()
            },
            cover: Some(CoverId::Stored("abc.img".to_string())),
        }
    }

    #[tokio::test]
    async fn test_round_trip_same_version() {
        let repo = setup_repo().await;
        let file = FileHandle::new("/music/roygbiv.flac", "/music", 1_000, 2_048);

        repo.upsert(&file, &entry("Roygbiv")).await.unwrap();

        let found = repo.find(&file).await.unwrap();
        assert_eq!(found, Some(entry("Roygbiv")));
    }

    #[tokio::test]
    async fn test_touched_file_misses() {
        let repo = setup_repo().await;
        let file = FileHandle::new("/music/roygbiv.flac", "/music", 1_000, 2_048);
        repo.upsert(&file, &entry("Roygbiv")).await.unwrap();

        let touched = FileHandle {
            last_modified: 2_000,
            ..file.clone()
        };
        assert!(repo.find(&touched).await.unwrap().is_none());

        let moved = FileHandle {
            path: "/music/moved.flac".into(),
            ..file
        };
        assert!(repo.find(&moved).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let repo = setup_repo().await;
        let file = FileHandle::new("/music/a.mp3", "/music", 5, 10);

        repo.upsert(&file, &entry("A")).await.unwrap();
        repo.upsert(&file, &entry("A")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);

        repo.upsert(&file, &entry("A (Remastered)")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
        let found = repo.find(&file).await.unwrap().unwrap();
        assert_eq!(found.tags.name.as_deref(), Some("A (Remastered)"));
    }

    #[tokio::test]
    async fn test_entry_without_cover() {
        let repo = setup_repo().await;
        let file = FileHandle::new("/music/b.ogg", "/music", 5, 10);
        let bare = CachedTags {
            cover: None,
            ..entry("B")
        };

        repo.upsert(&file, &bare).await.unwrap();
        assert_eq!(repo.find(&file).await.unwrap().unwrap().cover, None);
    }
}
