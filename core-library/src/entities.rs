//! # Final Entities
//!
//! Immutable songs, albums, artists, genres and playlists produced by one
//! indexing run. Relationships are stored as [`MusicUid`]s and resolved
//! through the [`Library`](crate::library::Library) that owns them, so no
//! entity holds a reference to another.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::models::{
    CoverCollection, Date, DateRange, MusicUid, Name, ReleaseType, ReplayGain, SingleCover,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Disc {
    pub number: u32,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub uid: MusicUid,
    pub name: Name,
    pub musicbrainz_id: Option<Uuid>,
    pub path: PathBuf,
    pub size: u64,
    /// Modification time of the file version this song was read from
    pub modified_ms: i64,
    pub duration_ms: u64,
    pub track: Option<u32>,
    pub disc: Option<Disc>,
    pub date: Option<Date>,
    pub replay_gain: ReplayGain,
    pub cover: Option<SingleCover>,
    pub album: MusicUid,
    /// Artists in tag order
    pub artists: Vec<MusicUid>,
    pub genres: Vec<MusicUid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub uid: MusicUid,
    pub name: Name,
    pub musicbrainz_id: Option<Uuid>,
    pub release_type: ReleaseType,
    pub dates: Option<DateRange>,
    pub duration_ms: u64,
    pub covers: CoverCollection,
    /// Sorted by disc, then track, then name
    pub songs: Vec<MusicUid>,
    /// Album artists in tag order
    pub artists: Vec<MusicUid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub uid: MusicUid,
    pub name: Name,
    pub musicbrainz_id: Option<Uuid>,
    pub songs: Vec<MusicUid>,
    /// Albums this artist is credited as album artist on
    pub explicit_albums: Vec<MusicUid>,
    /// Albums this artist only appears on through individual songs
    pub implicit_albums: Vec<MusicUid>,
    pub genres: Vec<MusicUid>,
    pub duration_ms: u64,
    pub covers: CoverCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub uid: MusicUid,
    pub name: Name,
    pub songs: Vec<MusicUid>,
    pub artists: Vec<MusicUid>,
    pub duration_ms: u64,
    pub covers: CoverCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub uid: MusicUid,
    pub name: String,
    /// Songs that exist in the library, in playlist order
    pub songs: Vec<MusicUid>,
    pub duration_ms: u64,
}
