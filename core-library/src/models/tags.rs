use serde::{Deserialize, Serialize};

use super::date::Date;
use super::file::FileHandle;
use super::uid::{parse_mbid, MusicKind, MusicUid};

/// Volume adjustments in dB
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayGain {
    pub track: Option<f32>,
    pub album: Option<f32>,
}

/// Normalized tag values of one file version.
///
/// Produced once per `(path, last_modified)` and never modified afterwards.
/// List fields are unsplit here; separator handling happens at
/// interpretation time so that a settings change does not need a re-parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTags {
    pub duration_ms: u64,
    pub replay_gain: ReplayGain,
    pub musicbrainz_id: Option<String>,
    pub name: Option<String>,
    pub sort_name: Option<String>,
    pub track: Option<u32>,
    pub disc: Option<u32>,
    pub subtitle: Option<String>,
    pub date: Option<Date>,
    pub album_musicbrainz_id: Option<String>,
    pub album_name: Option<String>,
    pub album_sort_name: Option<String>,
    pub release_types: Vec<String>,
    pub artist_musicbrainz_ids: Vec<String>,
    pub artist_names: Vec<String>,
    pub artist_sort_names: Vec<String>,
    pub album_artist_musicbrainz_ids: Vec<String>,
    pub album_artist_names: Vec<String>,
    pub album_artist_sort_names: Vec<String>,
    pub genre_names: Vec<String>,
}

impl ParsedTags {
    /// Song name, or the file name without its extension.
    pub fn name_or_file<'a>(&'a self, file: &'a FileHandle) -> Option<&'a str> {
        self.name.as_deref().or_else(|| file.stem())
    }

    /// Album name, or the name of the containing directory.
    pub fn album_name_or_directory<'a>(&'a self, file: &'a FileHandle) -> Option<&'a str> {
        self.album_name.as_deref().or_else(|| file.directory_name())
    }

    /// Stable identity of the song in `file`.
    ///
    /// A valid MusicBrainz track ID wins. Otherwise the UID is hashed from the
    /// fields that identify a recording, so retagging the genre or cover
    /// keeps the UID while renaming the track does not.
    pub fn song_uid(&self, file: &FileHandle) -> MusicUid {
        if let Some(mbid) = parse_mbid(self.musicbrainz_id.as_deref()) {
            return MusicUid::musicbrainz(MusicKind::Song, mbid);
        }
        MusicUid::hashed(MusicKind::Song, |h| {
            h.str(self.name_or_file(file))
                .str(self.album_name_or_directory(file))
                .date(self.date.as_ref())
                .int(self.track)
                .int(self.disc)
                .strs(&self.artist_names)
                .strs(&self.album_artist_names);
        })
    }
}
