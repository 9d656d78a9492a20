use core_library::models::{MusicKind, MusicUid};

use super::{Resolved, VertexId, Vertices};
use crate::interpret::pre::{PreGenre, PreSong};

/// Groups songs by genre. Genres carry no MusicBrainz ID, so same-named
/// genres always merge.
pub struct GenreLinker {
    vertices: Vertices<PreGenre>,
}

impl GenreLinker {
    pub fn new() -> Self {
        Self {
            vertices: Vertices::new(),
        }
    }

    /// Genre vertices of `song`, in tag order
    pub fn register(&mut self, song: &PreSong) -> Vec<VertexId> {
        song.genres.iter().map(|genre| self.vertices.attach(genre)).collect()
    }

    pub fn resolve(self) -> Resolved<PreGenre> {
        self.vertices.resolve(
            |genre| genre.raw_name.as_deref(),
            |_| None,
            |cluster| vec![cluster.to_vec()],
            |genre, _| {
                MusicUid::hashed(MusicKind::Genre, |h| {
                    h.str(genre.raw_name.as_deref());
                })
            },
        )
    }
}

impl Default for GenreLinker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RawSong;
    use crate::interpret::pre::TagInterpreter;
    use core_library::models::{FileHandle, ParsedTags};
    use core_runtime::config::Interpretation;

    fn song(path: &str, genres: &[&str]) -> PreSong {
        let raw = RawSong {
            file: FileHandle::new(path, "/music", 0, 0),
            tags: ParsedTags {
                genre_names: genres.iter().map(|g| g.to_string()).collect(),
                ..Default::default()
            },
            cover: None,
        };
        TagInterpreter::new(&Interpretation::default()).interpret(&raw)
    }

    #[test]
    fn test_case_variants_merge_into_most_used() {
        let mut linker = GenreLinker::new();
        let a = linker.register(&song("/music/a.mp3", &["rock"]));
        let b = linker.register(&song("/music/b.mp3", &["Rock"]));
        let c = linker.register(&song("/music/c.mp3", &["Rock", "Jazz"]));

        let resolved = linker.resolve();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.uid_of(a[0]), resolved.uid_of(b[0]));
        assert_eq!(resolved.uid_of(a[0]), resolved.uid_of(c[0]));
        assert_eq!(resolved.entities()[0].pre.raw_name.as_deref(), Some("Rock"));
        assert_eq!(
            resolved.entities()[1].pre.raw_name.as_deref(),
            Some("Jazz")
        );
    }

    #[test]
    fn test_untagged_songs_share_unknown_genre() {
        let mut linker = GenreLinker::new();
        let a = linker.register(&song("/music/a.mp3", &[]));
        let b = linker.register(&song("/music/b.mp3", &[]));

        let resolved = linker.resolve();
        assert_eq!(resolved.len(), 1);
        assert_eq!(a, b);
        assert!(resolved.entities()[0].pre.name.is_unknown());
    }

    #[test]
    fn test_uid_is_stable() {
        let uid = |genres: &[&str]| {
            let mut linker = GenreLinker::new();
            let ids = linker.register(&song("/music/a.mp3", genres));
            linker.resolve().uid_of(ids[0])
        };
        assert_eq!(uid(&["Post-Rock"]), uid(&["Post-Rock"]));
        assert_ne!(uid(&["Post-Rock"]), uid(&["Math Rock"]));
    }
}
