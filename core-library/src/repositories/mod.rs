//! # Repository Pattern Implementation
//!
//! Persistence for the three stores that outlive an indexing run.
//!
//! ## Architecture
//!
//! - Traits define the interface for each repository so the pipeline can be
//!   tested against mocks
//! - SQLite implementations use sqlx for async database access
//! - All operations return `Result<T>` for error handling
//!
//! ## Available Repositories
//!
//! - `TagCacheRepository` - Parsed tags keyed by file path and modification time
//! - `StoredCoverRepository` - Song version to cover blob mapping
//! - `PlaylistRepository` - User playlists and their ordered songs

pub mod playlist;
pub mod stored_cover;
pub mod tag_cache;

pub use playlist::{PlaylistRecord, PlaylistRepository, SqlitePlaylistRepository};
pub use stored_cover::{SqliteStoredCoverRepository, StoredCover, StoredCoverRepository};
pub use tag_cache::{CachedTags, SqliteTagCacheRepository, TagCacheRepository};
