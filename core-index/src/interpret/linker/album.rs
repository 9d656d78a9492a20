use core_library::models::{MusicKind, MusicUid};

use super::artist::ArtistVertices;
use super::{group_by, Resolved, VertexId, Vertices};
use crate::interpret::pre::{ArtistSource, PreAlbum, PreArtist, PreSong};

/// Groups songs by album.
///
/// Without full MusicBrainz coverage, same-named albums are told apart by
/// their resolved album artists, but only when every one of them was tagged
/// with album artists. A cluster with any album that borrowed its song's
/// artists merges as a whole. Hashed UIDs cover the name and the UIDs of the
/// resolved album artists, so albums split by artist never share one.
pub struct AlbumLinker {
    vertices: Vertices<PreAlbum>,
    /// Album artist vertices, by album vertex
    artists: Vec<Vec<VertexId>>,
}

/// Albums plus the artist entities credited on each.
#[derive(Debug, Clone)]
pub struct ResolvedAlbums {
    pub albums: Resolved<PreAlbum>,
    /// Indices into the artist entities, by album entity, in credit order
    pub artists: Vec<Vec<usize>>,
}

impl AlbumLinker {
    pub fn new() -> Self {
        Self {
            vertices: Vertices::new(),
            artists: Vec::new(),
        }
    }

    pub fn register(&mut self, song: &PreSong, artists: &ArtistVertices) -> VertexId {
        let id = self.vertices.attach(&song.album);
        if id == self.artists.len() {
            self.artists.push(artists.album_artists.clone());
        }
        id
    }

    /// Must be given the resolution of the artists registered alongside.
    pub fn resolve(self, artists: &Resolved<PreArtist>) -> ResolvedAlbums {
        let album_artists = &self.artists;
        let albums = self.vertices.resolve(
            |album| album.raw_name.as_deref(),
            |album| album.musicbrainz_id,
            |cluster| {
                let all_tagged = cluster
                    .iter()
                    .all(|&id| self.vertices.get(id).artist_source == ArtistSource::Album);
                if all_tagged {
                    group_by(cluster.iter().copied(), |&id| {
                        artists.indices_of(&album_artists[id])
                    })
                } else {
                    vec![cluster.to_vec()]
                }
            },
            |album, musicbrainz_id| match musicbrainz_id {
                Some(mbid) => MusicUid::musicbrainz(MusicKind::Album, mbid),
                None => {
                    let credited = self
                        .vertices
                        .id_of(album)
                        .map(|id| artists.uids_of(&album_artists[id]))
                        .unwrap_or_default();
                    MusicUid::hashed(MusicKind::Album, |h| {
                        h.str(album.raw_name.as_deref());
                        for artist in &credited {
                            h.str(Some(artist.to_string().as_str()));
                        }
                    })
                }
            },
        );

        let credits = albums
            .entities()
            .iter()
            .map(|entity| {
                let vertices: Vec<VertexId> = entity
                    .members
                    .iter()
                    .flat_map(|&member| album_artists[member].iter().copied())
                    .collect();
                artists.indices_of(&vertices)
            })
            .collect();

        ResolvedAlbums {
            albums,
            artists: credits,
        }
    }
}

impl Default for AlbumLinker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RawSong;
    use crate::interpret::linker::ArtistLinker;
    use crate::interpret::pre::TagInterpreter;
    use core_library::models::{FileHandle, ParsedTags};
    use core_runtime::config::Interpretation;

    struct Fixture {
        artists: ArtistLinker,
        albums: AlbumLinker,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                artists: ArtistLinker::new(),
                albums: AlbumLinker::new(),
            }
        }

        fn register(&mut self, tags: ParsedTags) -> VertexId {
            let raw = RawSong {
                file: FileHandle::new("/music/Various/song.mp3", "/music", 0, 0),
                tags,
                cover: None,
            };
            let song = TagInterpreter::new(&Interpretation::default()).interpret(&raw);
            let artists = self.artists.register(&song);
            self.albums.register(&song, &artists)
        }

        fn resolve(self) -> (Resolved<PreArtist>, ResolvedAlbums) {
            let artists = self.artists.resolve();
            let albums = self.albums.resolve(&artists);
            (artists, albums)
        }
    }

    fn tags(album: &str, album_artist: Option<&str>, artist: &str) -> ParsedTags {
        ParsedTags {
            album_name: Some(album.to_string()),
            album_artist_names: album_artist.map(str::to_string).into_iter().collect(),
            artist_names: vec![artist.to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_same_name_different_album_artists_stay_distinct() {
        let mut fixture = Fixture::new();
        let a = fixture.register(tags("Greatest Hits", Some("Queen"), "Queen"));
        let b = fixture.register(tags("Greatest Hits", Some("ABBA"), "ABBA"));

        let (artists, resolved) = fixture.resolve();
        assert_eq!(resolved.albums.len(), 2);
        assert_ne!(resolved.albums.uid_of(a), resolved.albums.uid_of(b));

        let credited = &resolved.artists[resolved.albums.index_of(a)];
        assert_eq!(credited.len(), 1);
        assert_eq!(
            artists.entities()[credited[0]].pre.raw_name.as_deref(),
            Some("Queen")
        );
    }

    #[test]
    fn test_album_artist_casing_merges() {
        let mut fixture = Fixture::new();
        let a = fixture.register(tags("Abbey Road", Some("The Beatles"), "The Beatles"));
        let b = fixture.register(tags("abbey road", Some("the beatles"), "The Beatles"));

        let (_, resolved) = fixture.resolve();
        assert_eq!(resolved.albums.len(), 1);
        assert_eq!(resolved.albums.uid_of(a), resolved.albums.uid_of(b));
    }

    #[test]
    fn test_untagged_album_artist_merges_cluster() {
        let mut fixture = Fixture::new();
        let a = fixture.register(tags("Live", Some("Band A"), "Band A"));
        let b = fixture.register(tags("Live", None, "Band B"));

        let (_, resolved) = fixture.resolve();
        assert_eq!(resolved.albums.len(), 1);
        assert_eq!(resolved.albums.index_of(a), resolved.albums.index_of(b));
        // Credits of every merged album are kept
        assert_eq!(resolved.artists[0].len(), 2);
    }

    #[test]
    fn test_same_name_artists_with_distinct_ids_get_distinct_albums() {
        let mut fixture = Fixture::new();
        let nirvana = |mbid: &str| ParsedTags {
            artist_musicbrainz_ids: vec![mbid.to_string()],
            album_artist_musicbrainz_ids: vec![mbid.to_string()],
            ..tags("Nevermind", Some("Nirvana"), "Nirvana")
        };
        let a = fixture.register(nirvana("5b11f4ce-a62d-471e-81fc-a69a8278c7da"));
        let b = fixture.register(nirvana("9282c8b4-ca0b-4c6b-b7e3-4f7762dfc4d6"));

        let (artists, resolved) = fixture.resolve();
        assert_eq!(artists.len(), 2);
        assert_eq!(resolved.albums.len(), 2);
        assert_ne!(resolved.albums.uid_of(a), resolved.albums.uid_of(b));
    }

    #[test]
    fn test_musicbrainz_ids_split_same_names() {
        let mut fixture = Fixture::new();
        let a = fixture.register(ParsedTags {
            album_musicbrainz_id: Some("0b3d5ed1-4f3a-4cd6-a6ad-1e2f3a4b5c6d".into()),
            ..tags("Untitled", None, "X")
        });
        let b = fixture.register(ParsedTags {
            album_musicbrainz_id: Some("9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d".into()),
            ..tags("Untitled", None, "X")
        });

        let (_, resolved) = fixture.resolve();
        assert_eq!(resolved.albums.len(), 2);
        assert_ne!(resolved.albums.uid_of(a), resolved.albums.uid_of(b));
    }
}
