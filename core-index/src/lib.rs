//! # Indexing Module
//!
//! Turns the audio files under a set of roots into a [`Library`].
//!
//! ## Overview
//!
//! A run streams files through these stages:
//! - [`explorer`]: walks the roots for audio files
//! - [`cache`]: reuses tags parsed on earlier runs
//! - [`extract`]: reads, parses and identifies covers for everything else
//! - [`interpret`]: links songs into albums, artists and genres
//!
//! [`pipeline::Indexer`] connects them with bounded channels and handles
//! cancellation and progress events. [`playlist`] imports and exports M3U
//! playlists against a finished library.
//!
//! ## Usage
//!
//! ```ignore
//! use core_index::Indexer;
//! use tokio_util::sync::CancellationToken;
//!
//! let indexer = Indexer::open(config).await?;
//! let result = indexer.run(CancellationToken::new()).await?;
//! result.cleanup().await?;
//! let library = result.into_library();
//! ```
//!
//! [`Library`]: core_library::Library

pub mod cache;
pub mod error;
pub mod explorer;
pub mod extract;
pub mod interpret;
pub mod pipeline;
pub mod playlist;
mod stage;

pub use error::{IndexError, Result};
pub use extract::RawSong;
pub use pipeline::{Indexer, LibraryResult};
pub use playlist::{ImportedPlaylist, PlaylistImporter};
pub use stage::Progress;
