//! # Library Management Module
//!
//! Owns the music data model, the immutable [`Library`] produced by an
//! indexing run, and the SQLite stores that persist between runs.
//!
//! ## Overview
//!
//! This module manages:
//! - Value types: file handles, parsed tags, UIDs, dates, names and covers
//! - Final entities and the arena-backed [`Library`]
//! - SQLite schema, migrations and repositories for the tag cache, stored
//!   cover mappings and playlists
//! - [`StoredPlaylists`] and the [`PlaylistHandle`] used to edit them

pub mod db;
pub mod entities;
pub mod error;
pub mod library;
pub mod models;
pub mod playlists;
pub mod repositories;

pub use entities::{Album, Artist, Disc, Genre, Playlist, Song};
pub use error::{LibraryError, Result};
pub use library::Library;
pub use playlists::{PlaylistFile, PlaylistHandle, StoredPlaylists};
