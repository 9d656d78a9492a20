//! Facade crate for the music indexer workspace.
//!
//! Host applications depend on `music-indexer` and reach the individual
//! workspace crates through the re-exports below instead of wiring each one.
//!
//! ```ignore
//! use music_indexer::index::Indexer;
//! use music_indexer::runtime::config::IndexerConfig;
//!
//! let config = IndexerConfig::builder()
//!     .root("/home/me/Music")
//!     .database_path("/home/me/.local/share/indexer/library.db")
//!     .cover_dir("/home/me/.cache/indexer/covers")
//!     .build()?;
//! ```

pub use bridge_traits as bridge;
pub use core_index as index;
pub use core_library as library;
pub use core_metadata as metadata;
pub use core_runtime as runtime;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop as desktop;
