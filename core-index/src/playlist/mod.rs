//! # Playlists
//!
//! External M3U playlists: parsing and writing in [`m3u`], and moving them
//! in and out of the library through [`PlaylistImporter`].

pub mod importer;
pub mod m3u;

pub use importer::PlaylistImporter;
pub use m3u::ImportedPlaylist;
