//! # Interpreter
//!
//! Builds a [`Library`] from every song of a run. Songs are interpreted into
//! [`PreSong`]s, threaded through the genre, artist and album linkers in that
//! order, and the resolved groups are materialized into final entities with
//! their derived data (durations, date ranges, covers, back-references).
//!
//! Songs are processed in path order whatever order they arrived in, so an
//! unchanged file set always produces the same library.

use core_library::models::{CoverCollection, DateRange, MusicUid};
use core_library::{Album, Artist, Genre, Library, PlaylistFile, Song};
use core_runtime::config::Interpretation;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

use super::linker::album::ResolvedAlbums;
use super::linker::artist::ArtistVertices;
use super::linker::{AlbumLinker, ArtistLinker, GenreLinker, Resolved, VertexId};
use super::pre::{PreArtist, PreGenre, PreSong, TagInterpreter};
use crate::extract::RawSong;

/// A song and the linker vertices it was registered under.
#[derive(Debug, Clone)]
pub struct LinkedSong {
    pub pre: PreSong,
    pub genres: Vec<VertexId>,
    pub artists: ArtistVertices,
    pub album: VertexId,
}

pub struct Interpreter {
    tags: TagInterpreter,
}

impl Interpreter {
    pub fn new(interpretation: &Interpretation) -> Self {
        Self {
            tags: TagInterpreter::new(interpretation),
        }
    }

    #[instrument(skip_all, fields(songs = songs.len(), playlists = playlists.len()))]
    pub fn interpret(&self, mut songs: Vec<RawSong>, playlists: Vec<PlaylistFile>) -> Library {
        songs.sort_by(|a, b| {
            a.file
                .path
                .cmp(&b.file.path)
                .then(a.file.last_modified.cmp(&b.file.last_modified))
        });

        let mut seen = HashSet::with_capacity(songs.len());
        let mut genres = GenreLinker::new();
        let mut artists = ArtistLinker::new();
        let mut albums = AlbumLinker::new();

        let mut linked = Vec::with_capacity(songs.len());
        for raw in &songs {
            let pre = self.tags.interpret(raw);
            if !seen.insert(pre.uid) {
                debug!(uid = %pre.uid, path = %pre.path.display(), "Dropping duplicate song");
                continue;
            }
            let genre_vertices = genres.register(&pre);
            let artist_vertices = artists.register(&pre);
            let album = albums.register(&pre, &artist_vertices);
            linked.push(LinkedSong {
                pre,
                genres: genre_vertices,
                artists: artist_vertices,
                album,
            });
        }

        let genres = genres.resolve();
        let artists = artists.resolve();
        let albums = albums.resolve(&artists);

        let library = Assembly::new(&linked, &genres, &artists, &albums).finish(playlists);
        info!(
            songs = library.songs().len(),
            albums = library.albums().len(),
            artists = library.artists().len(),
            genres = library.genres().len(),
            "Library assembled"
        );
        library
    }
}

/// Entity indices each linked song resolved to.
struct SongLinks {
    genres: Vec<usize>,
    artists: Vec<usize>,
    album: usize,
}

struct Assembly<'a> {
    songs: &'a [LinkedSong],
    links: Vec<SongLinks>,
    genres: &'a Resolved<PreGenre>,
    artists: &'a Resolved<PreArtist>,
    albums: &'a ResolvedAlbums,
}

impl<'a> Assembly<'a> {
    fn new(
        songs: &'a [LinkedSong],
        genres: &'a Resolved<PreGenre>,
        artists: &'a Resolved<PreArtist>,
        albums: &'a ResolvedAlbums,
    ) -> Self {
        let links = songs
            .iter()
            .map(|song| SongLinks {
                genres: genres.indices_of(&song.genres),
                artists: artists.indices_of(&song.artists.artists),
                album: albums.albums.index_of(song.album),
            })
            .collect();
        Self {
            songs,
            links,
            genres,
            artists,
            albums,
        }
    }

    fn finish(self, playlists: Vec<PlaylistFile>) -> Library {
        let mut album_songs = vec![Vec::new(); self.albums.albums.len()];
        let mut artist_songs = vec![Vec::new(); self.artists.len()];
        let mut genre_songs = vec![Vec::new(); self.genres.len()];
        for (i, links) in self.links.iter().enumerate() {
            album_songs[links.album].push(i);
            for &artist in &links.artists {
                artist_songs[artist].push(i);
            }
            for &genre in &links.genres {
                genre_songs[genre].push(i);
            }
        }

        let songs = self.songs();
        let albums = self.albums(&songs, album_songs);
        let artists = self.artists(&songs, &albums, artist_songs);
        let genres = self.genres(&songs, genre_songs);
        Library::new(songs, albums, artists, genres, playlists)
    }

    fn songs(&self) -> Vec<Song> {
        self.songs
            .iter()
            .zip(&self.links)
            .map(|(song, links)| {
                let pre = &song.pre;
                Song {
                    uid: pre.uid,
                    name: pre.name.clone(),
                    musicbrainz_id: pre.musicbrainz_id,
                    path: pre.path.clone(),
                    size: pre.size,
                    modified_ms: pre.modified_ms,
                    duration_ms: pre.duration_ms,
                    track: pre.track,
                    disc: pre.disc.clone(),
                    date: pre.date,
                    replay_gain: pre.replay_gain,
                    cover: pre.cover.clone(),
                    album: self.albums.albums.entities()[links.album].uid,
                    artists: self.artist_uids(&links.artists),
                    genres: links
                        .genres
                        .iter()
                        .map(|&g| self.genres.entities()[g].uid)
                        .collect(),
                }
            })
            .collect()
    }

    fn artist_uids(&self, indices: &[usize]) -> Vec<MusicUid> {
        indices
            .iter()
            .map(|&a| self.artists.entities()[a].uid)
            .collect()
    }

    fn albums(&self, songs: &[Song], members: Vec<Vec<usize>>) -> Vec<Album> {
        self.albums
            .albums
            .entities()
            .iter()
            .zip(members)
            .zip(&self.albums.artists)
            .map(|((entity, mut members), credits)| {
                members.sort_by(|&a, &b| {
                    let (a, b) = (&songs[a], &songs[b]);
                    a.disc
                        .as_ref()
                        .map(|d| d.number)
                        .cmp(&b.disc.as_ref().map(|d| d.number))
                        .then(a.track.cmp(&b.track))
                        .then_with(|| a.name.cmp(&b.name))
                });
                Album {
                    uid: entity.uid,
                    name: entity.pre.name.clone(),
                    musicbrainz_id: entity.musicbrainz_id,
                    release_type: entity.pre.release_type,
                    dates: DateRange::from_dates(members.iter().filter_map(|&s| songs[s].date)),
                    duration_ms: duration(songs, &members),
                    covers: covers(songs, &members),
                    songs: members.iter().map(|&s| songs[s].uid).collect(),
                    artists: self.artist_uids(credits),
                }
            })
            .collect()
    }

    fn artists(&self, songs: &[Song], albums: &[Album], members: Vec<Vec<usize>>) -> Vec<Artist> {
        // Albums each artist entity is credited on
        let mut explicit = vec![Vec::new(); self.artists.len()];
        for (album, credits) in albums.iter().zip(&self.albums.artists) {
            for &artist in credits {
                explicit[artist].push(album.uid);
            }
        }

        self.artists
            .entities()
            .iter()
            .zip(members)
            .zip(explicit)
            .map(|((entity, members), explicit_albums)| {
                let mut implicit_albums = Vec::new();
                let mut genres = Vec::new();
                for &s in &members {
                    let album = songs[s].album;
                    if !explicit_albums.contains(&album) && !implicit_albums.contains(&album) {
                        implicit_albums.push(album);
                    }
                    for genre in &songs[s].genres {
                        if !genres.contains(genre) {
                            genres.push(*genre);
                        }
                    }
                }

                Artist {
                    uid: entity.uid,
                    name: entity.pre.name.clone(),
                    musicbrainz_id: entity.musicbrainz_id,
                    duration_ms: duration(songs, &members),
                    covers: covers(songs, &members),
                    songs: members.iter().map(|&s| songs[s].uid).collect(),
                    explicit_albums,
                    implicit_albums,
                    genres,
                }
            })
            .collect()
    }

    fn genres(&self, songs: &[Song], members: Vec<Vec<usize>>) -> Vec<Genre> {
        self.genres
            .entities()
            .iter()
            .zip(members)
            .map(|(entity, members)| {
                let mut artists = Vec::new();
                for &s in &members {
                    for artist in &songs[s].artists {
                        if !artists.contains(artist) {
                            artists.push(*artist);
                        }
                    }
                }
                Genre {
                    uid: entity.uid,
                    name: entity.pre.name.clone(),
                    duration_ms: duration(songs, &members),
                    covers: covers(songs, &members),
                    songs: members.iter().map(|&s| songs[s].uid).collect(),
                    artists,
                }
            })
            .collect()
    }
}

fn duration(songs: &[Song], members: &[usize]) -> u64 {
    members.iter().map(|&s| songs[s].duration_ms).sum()
}

fn covers(songs: &[Song], members: &[usize]) -> CoverCollection {
    CoverCollection::from_singles(members.iter().filter_map(|&s| songs[s].cover.as_ref()))
}
