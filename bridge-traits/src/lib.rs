//! # Host Bridge Traits
//!
//! Capability boundary between the indexing core and the host platform.
//!
//! ## Overview
//!
//! The indexer treats file enumeration and native tag parsing as opaque
//! capabilities. Each trait here is one of those capabilities; hosts ship a
//! concrete adapter (see `bridge-desktop`) and inject it when building the
//! indexer.
//!
//! ## Traits
//!
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Directory listing, metadata, blob I/O
//! - [`TagReader`](tags::TagReader) - Raw per-format tag maps plus embedded cover bytes
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert platform-specific errors to `BridgeError`
//! and include the offending path where one exists.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single adapter can be shared
//! by every pipeline stage.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::tags::{RawTags, TagReader};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct NativeTagReader;
//!
//! #[async_trait]
//! impl TagReader for NativeTagReader {
//!     async fn read_tags(&self, path: &Path) -> Result<RawTags> {
//!         // Call into the platform tag library
//!         todo!()
//!     }
//! }
//! ```

pub mod error;
pub mod storage;
pub mod tags;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use storage::{FileMetadata, FileSystemAccess};
pub use tags::{RawTags, TagReader};
pub use time::{Clock, LogLevel, SystemClock};
