use core_library::models::{MusicKind, MusicUid};

use super::{Resolved, VertexId, Vertices};
use crate::interpret::pre::{PreArtist, PreSong};

/// Song and album artists of one registered song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistVertices {
    pub artists: Vec<VertexId>,
    pub album_artists: Vec<VertexId>,
}

/// Groups songs by artist. Album artists are registered too so that an
/// artist who only appears as an album artist still becomes an entity.
pub struct ArtistLinker {
    vertices: Vertices<PreArtist>,
}

impl ArtistLinker {
    pub fn new() -> Self {
        Self {
            vertices: Vertices::new(),
        }
    }

    pub fn register(&mut self, song: &PreSong) -> ArtistVertices {
        let artists = song
            .artists
            .iter()
            .map(|artist| self.vertices.attach(artist))
            .collect();
        let album_artists = song
            .album
            .artists
            .iter()
            .map(|artist| self.vertices.vertex(artist))
            .collect();
        ArtistVertices {
            artists,
            album_artists,
        }
    }

    pub fn resolve(self) -> Resolved<PreArtist> {
        self.vertices.resolve(
            |artist| artist.raw_name.as_deref(),
            |artist| artist.musicbrainz_id,
            |cluster| vec![cluster.to_vec()],
            |artist, musicbrainz_id| match musicbrainz_id {
                Some(mbid) => MusicUid::musicbrainz(MusicKind::Artist, mbid),
                None => MusicUid::hashed(MusicKind::Artist, |h| {
                    h.str(artist.raw_name.as_deref());
                }),
            },
        )
    }
}

impl Default for ArtistLinker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RawSong;
    use crate::interpret::pre::TagInterpreter;
    use core_library::models::{FileHandle, ParsedTags, UidNamespace};
    use core_runtime::config::Interpretation;

    const MBID_A: &str = "0383dadf-2a4e-4d10-a46a-e9e041da8eb3";
    const MBID_B: &str = "5b11f4ce-a62d-471e-81fc-a69a8278c7da";

    fn song(path: &str, artist: &str, mbid: Option<&str>) -> PreSong {
        let raw = RawSong {
            file: FileHandle::new(path, "/music", 0, 0),
            tags: ParsedTags {
                artist_names: vec![artist.to_string()],
                artist_musicbrainz_ids: mbid.map(str::to_string).into_iter().collect(),
                ..Default::default()
            },
            cover: None,
        };
        TagInterpreter::new(&Interpretation::default()).interpret(&raw)
    }

    #[test]
    fn test_same_name_without_ids_merges() {
        let mut linker = ArtistLinker::new();
        let a = linker.register(&song("/music/a.mp3", "Nirvana", None));
        let b = linker.register(&song("/music/b.mp3", "Nirvana", None));

        let resolved = linker.resolve();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.uid_of(a.artists[0]), resolved.uid_of(b.artists[0]));
    }

    #[test]
    fn test_same_name_with_different_ids_stays_distinct() {
        let mut linker = ArtistLinker::new();
        let a = linker.register(&song("/music/a.mp3", "Nirvana", Some(MBID_A)));
        let b = linker.register(&song("/music/b.mp3", "Nirvana", Some(MBID_B)));

        let resolved = linker.resolve();
        assert_eq!(resolved.len(), 2);
        let uid = resolved.uid_of(a.artists[0]);
        assert_ne!(uid, resolved.uid_of(b.artists[0]));
        assert_eq!(uid.namespace(), UidNamespace::MusicBrainz);
    }

    #[test]
    fn test_album_artist_without_songs_is_an_entity() {
        let raw = RawSong {
            file: FileHandle::new("/music/a.mp3", "/music", 0, 0),
            tags: ParsedTags {
                artist_names: vec!["Guest".into()],
                album_artist_names: vec!["Host".into()],
                ..Default::default()
            },
            cover: None,
        };
        let song = TagInterpreter::new(&Interpretation::default()).interpret(&raw);

        let mut linker = ArtistLinker::new();
        let vertices = linker.register(&song);
        let resolved = linker.resolve();

        assert_eq!(resolved.len(), 2);
        assert_ne!(
            resolved.uid_of(vertices.artists[0]),
            resolved.uid_of(vertices.album_artists[0])
        );
    }
}
