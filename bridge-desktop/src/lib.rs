//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! - `FileSystemAccess` using `tokio::fs`
//!
//! Tag reading on desktop is provided by `core_metadata::LoftyTagReader`,
//! which needs nothing platform-specific.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::TokioFileSystem;
//! use std::sync::Arc;
//!
//! let fs = Arc::new(TokioFileSystem::new());
//! let covers = fs.cache_dir().join("covers");
//! ```

mod filesystem;

pub use filesystem::TokioFileSystem;
