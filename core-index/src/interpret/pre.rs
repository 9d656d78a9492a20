//! # Pre-link Records
//!
//! [`TagInterpreter`] turns a [`RawSong`] into a [`PreSong`]: names are built
//! with the configured naming mode, multi-value tags are split, and every
//! missing field gets its fallback. Nothing is linked yet; a `PreSong` only
//! describes the album, artists and genres it belongs to.

use core_library::models::{
    parse_mbid, Date, MusicUid, Name, ParsedTags, Placeholder, ReleaseType, ReplayGain,
    SingleCover,
};
use core_library::Disc;
use core_runtime::config::{Interpretation, NamingMode};
use std::path::PathBuf;
use uuid::Uuid;

use super::id3::parse_id3_genre_names;
use super::separators::Separators;
use crate::extract::RawSong;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreArtist {
    pub musicbrainz_id: Option<Uuid>,
    pub name: Name,
    pub raw_name: Option<String>,
}

impl PreArtist {
    pub fn unknown() -> Self {
        Self {
            musicbrainz_id: None,
            name: Name::Unknown(Placeholder::Artist),
            raw_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreGenre {
    pub name: Name,
    pub raw_name: Option<String>,
}

impl PreGenre {
    pub fn unknown() -> Self {
        Self {
            name: Name::Unknown(Placeholder::Genre),
            raw_name: None,
        }
    }
}

/// Where an album's artists were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtistSource {
    /// Album artist tags
    Album,
    /// The song's own artist tags
    Song,
    /// Neither tag was present
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreAlbum {
    pub musicbrainz_id: Option<Uuid>,
    pub name: Name,
    pub raw_name: Option<String>,
    pub release_type: ReleaseType,
    pub artists: Vec<PreArtist>,
    pub artist_source: ArtistSource,
}

/// A song before linking.
#[derive(Debug, Clone, PartialEq)]
pub struct PreSong {
    pub uid: MusicUid,
    pub musicbrainz_id: Option<Uuid>,
    pub name: Name,
    pub path: PathBuf,
    pub size: u64,
    pub modified_ms: i64,
    pub duration_ms: u64,
    pub track: Option<u32>,
    pub disc: Option<Disc>,
    pub date: Option<Date>,
    pub replay_gain: ReplayGain,
    pub cover: Option<SingleCover>,
    pub album: PreAlbum,
    /// Never empty
    pub artists: Vec<PreArtist>,
    /// Never empty
    pub genres: Vec<PreGenre>,
}

pub struct TagInterpreter {
    naming: NamingMode,
    separators: Separators,
}

impl TagInterpreter {
    pub fn new(interpretation: &Interpretation) -> Self {
        Self {
            naming: interpretation.naming,
            separators: Separators::new(&interpretation.separators),
        }
    }

    pub fn interpret(&self, song: &RawSong) -> PreSong {
        let RawSong { file, tags, cover } = song;
        let uid = song.uid();

        let song_artists = self.artists(
            &tags.artist_musicbrainz_ids,
            &tags.artist_names,
            &tags.artist_sort_names,
        );
        let album_artists = self.artists(
            &tags.album_artist_musicbrainz_ids,
            &tags.album_artist_names,
            &tags.album_artist_sort_names,
        );
        let album = self.album(song, &song_artists, &album_artists);

        let artists = match (song_artists.is_empty(), album_artists.is_empty()) {
            (false, _) => song_artists,
            (true, false) => album_artists,
            (true, true) => vec![PreArtist::unknown()],
        };
        let mut genres = self.genres(tags);
        if genres.is_empty() {
            genres.push(PreGenre::unknown());
        }

        let raw_name = tags
            .name_or_file(file)
            .or_else(|| file.file_name())
            .unwrap_or_default();

        PreSong {
            uid,
            musicbrainz_id: parse_mbid(tags.musicbrainz_id.as_deref()),
            name: Name::known(self.naming, raw_name, tags.sort_name.clone()),
            path: file.path.clone(),
            size: file.size,
            modified_ms: file.last_modified,
            duration_ms: tags.duration_ms,
            track: tags.track,
            disc: tags.disc.map(|number| Disc {
                number,
                subtitle: tags.subtitle.clone(),
            }),
            date: tags.date,
            replay_gain: tags.replay_gain,
            cover: cover.clone().map(|id| SingleCover {
                song_uid: uid,
                last_modified: file.last_modified,
                id,
            }),
            album,
            artists,
            genres,
        }
    }

    fn album(
        &self,
        song: &RawSong,
        song_artists: &[PreArtist],
        album_artists: &[PreArtist],
    ) -> PreAlbum {
        let tags = &song.tags;
        let raw_name = tags.album_name_or_directory(&song.file).map(str::to_string);
        let (artists, artist_source) = if !album_artists.is_empty() {
            (album_artists.to_vec(), ArtistSource::Album)
        } else if !song_artists.is_empty() {
            (song_artists.to_vec(), ArtistSource::Song)
        } else {
            (vec![PreArtist::unknown()], ArtistSource::Unknown)
        };

        PreAlbum {
            musicbrainz_id: parse_mbid(tags.album_musicbrainz_id.as_deref()),
            name: Name::new(
                self.naming,
                raw_name.as_deref(),
                tags.album_sort_name.as_deref(),
                Placeholder::Album,
            ),
            raw_name,
            release_type: ReleaseType::parse(&self.separators.split(&tags.release_types))
                .unwrap_or_default(),
            artists,
            artist_source,
        }
    }

    /// MBIDs and sort names pair with names by position.
    fn artists(&self, mbids: &[String], names: &[String], sort_names: &[String]) -> Vec<PreArtist> {
        let mbids = self.separators.split(mbids);
        let sort_names = self.separators.split(sort_names);
        self.separators
            .split(names)
            .into_iter()
            .enumerate()
            .map(|(i, raw)| PreArtist {
                musicbrainz_id: parse_mbid(mbids.get(i).map(String::as_str)),
                name: Name::known(self.naming, raw.clone(), sort_names.get(i).cloned()),
                raw_name: Some(raw),
            })
            .collect()
    }

    fn genres(&self, tags: &ParsedTags) -> Vec<PreGenre> {
        parse_id3_genre_names(&tags.genre_names)
            .unwrap_or_else(|| self.separators.split(&tags.genre_names))
            .into_iter()
            .map(|raw| PreGenre {
                name: Name::known(self.naming, raw.clone(), None),
                raw_name: Some(raw),
            })
            .collect()
    }
}
