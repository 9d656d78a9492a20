//! Extended M3U reading and writing.
//!
//! Only `#PLAYLIST` is understood on read; every other `#` line is skipped.
//! Entries are resolved against the directory holding the playlist, so
//! `./a.mp3`, `a.mp3` and `../x/a.mp3` all work. An absolute entry is kept
//! absolute.

use core_library::models::MusicUid;
use core_library::{Library, Playlist, Song};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

const BOM: char = '\u{feff}';

/// Paths read out of an M3U file, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedPlaylist {
    pub name: Option<String>,
    pub paths: Vec<PathBuf>,
}

impl ImportedPlaylist {
    /// UIDs of the songs in `library` the paths point to. Paths with no
    /// matching song are dropped and the rest keep their order.
    pub fn resolve(&self, library: &Library) -> Vec<MusicUid> {
        let uids: Vec<_> = self
            .paths
            .iter()
            .filter_map(|path| library.find_song_by_path(path))
            .map(|song| song.uid)
            .collect();
        if uids.len() < self.paths.len() {
            debug!(
                missing = self.paths.len() - uids.len(),
                "Dropped playlist entries missing from the library"
            );
        }
        uids
    }
}

/// Parse `text` as an M3U playlist stored in `working_dir`.
///
/// `None` means nothing usable was found, which is distinct from a
/// playlist with entries that later fail to resolve.
pub fn read(text: &str, working_dir: &Path) -> Option<ImportedPlaylist> {
    let mut name = None;
    let mut paths = Vec::new();
    let mut pending_metadata = false;

    for line in text.lines() {
        let line = line.trim_start_matches(BOM).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(metadata) = line.strip_prefix('#') {
            pending_metadata = true;
            let (key, value) = metadata.split_once(':').unwrap_or((metadata, ""));
            if key == "PLAYLIST" {
                let value = value.trim();
                name = (!value.is_empty()).then(|| value.to_string());
            }
            continue;
        }

        pending_metadata = false;
        paths.push(resolve_entry(line, working_dir));
    }

    if pending_metadata && !paths.is_empty() {
        warn!("Playlist ended where an entry was expected");
    }

    if paths.is_empty() {
        None
    } else {
        Some(ImportedPlaylist { name, paths })
    }
}

fn resolve_entry(entry: &str, working_dir: &Path) -> PathBuf {
    let mut resolved = if entry.starts_with('/') {
        PathBuf::from("/")
    } else {
        working_dir.to_path_buf()
    };

    for segment in entry.split(['/', '\\']).filter(|s| !s.is_empty()) {
        match segment {
            "." => {}
            ".." => {
                resolved.pop();
            }
            _ => resolved.push(segment),
        }
    }
    resolved
}

/// Render `playlist` as extended M3U for a file stored in `working_dir`.
///
/// Song paths are written relative to `working_dir`. Songs the playlist
/// points to that are missing from `library` are skipped.
pub fn write(playlist: &Playlist, library: &Library, working_dir: &Path) -> String {
    let mut lines = vec![
        "#EXTM3U".to_string(),
        "#EXTENC:UTF-8".to_string(),
        format!("#PLAYLIST:{}", playlist.name),
    ];

    for song in library.resolve_songs(&playlist.songs) {
        let album = library
            .find_album(&song.album)
            .map(|album| album.name.to_string())
            .unwrap_or_default();
        lines.extend([
            format!("#EXTINF:{},{}", song.duration_ms, song.name),
            format!("#EXTALB:{album}"),
            format!("#EXTART:{}", artist_names(song, library)),
            format!("#EXTGEN:{}", genre_names(song, library)),
            relative_to(&song.path, working_dir),
        ]);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn artist_names(song: &Song, library: &Library) -> String {
    song.artists
        .iter()
        .filter_map(|uid| library.find_artist(uid))
        .map(|artist| artist.name.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn genre_names(song: &Song, library: &Library) -> String {
    song.genres
        .iter()
        .filter_map(|uid| library.find_genre(uid))
        .map(|genre| genre.name.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `path` as seen from `working_dir`, always starting with `.`
fn relative_to(path: &Path, working_dir: &Path) -> String {
    let path = normal_components(path);
    let base = normal_components(working_dir);
    let common = path
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts = vec![".".to_string()];
    parts.extend(std::iter::repeat("..".to_string()).take(base.len() - common));
    parts.extend(path[common..].iter().cloned());
    parts.join("/")
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}
