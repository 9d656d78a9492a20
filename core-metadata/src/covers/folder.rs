//! Folder covers
//!
//! Many libraries keep one `cover.jpg` per album directory instead of
//! embedding art in every file. [`FolderCoverSource`] picks the most
//! cover-like image next to a song.

use async_trait::async_trait;
use bridge_traits::FileSystemAccess;
use bytes::Bytes;
use core_library::models::CoverId;
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

use super::{CoverCandidate, CoverSource};
use crate::error::Result;

const PREFERRED_NAMES: &[&str] = &["front", "art", "album", "folder", "cover"];

const PREFERRED_EXTENSIONS: &[&str] = &["webp", "jpg", "jpeg", "png"];

const PREFERRED_FORMATS: &[&str] = &["image/webp", "image/jpg", "image/jpeg", "image/png"];

/// Image files sitting next to the audio files.
pub struct FolderCoverSource {
    file_system: Arc<dyn FileSystemAccess>,
}

impl FolderCoverSource {
    pub fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self { file_system }
    }
}

#[async_trait]
impl CoverSource for FolderCoverSource {
    async fn identify(&self, candidate: &CoverCandidate<'_>) -> Result<Option<CoverId>> {
        let Some(directory) = candidate.file.directory() else {
            return Ok(None);
        };
        let directory_name = candidate.file.directory_name();

        let mut best: Option<(u32, &Path)> = None;
        let mut siblings = self.file_system.list_directory(directory).await?;
        // Listing order is platform-defined; ties go to the first path
        siblings.sort();
        for path in &siblings {
            let score = cover_score(path, directory_name);
            if score > best.map_or(0, |(top, _)| top) {
                best = Some((score, path.as_path()));
            }
        }

        Ok(best.map(|(score, path)| {
            trace!(score, "Found folder cover: {}", path.display());
            CoverId::Folder(path.to_path_buf())
        }))
    }

    async fn open(&self, id: &CoverId) -> Result<Option<Bytes>> {
        let CoverId::Folder(path) = id else {
            return Ok(None);
        };
        // The image may have been removed since it was identified
        if !self.file_system.exists(path).await? {
            return Ok(None);
        }
        Ok(Some(self.file_system.read_file(path).await?))
    }
}

fn mime_type(extension: &str) -> Option<&'static str> {
    match extension {
        "webp" => Some("image/webp"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// How likely `path` is to be the cover of the songs next to it.
///
/// Zero means not a cover. Each preferred name contained in the file stem
/// adds its 1-based position, with the directory name as the last preferred
/// name; the sum is weighted by format and extension.
fn cover_score(path: &Path, directory_name: Option<&str>) -> u32 {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let Some(mime) = mime_type(&extension) else {
        return 0;
    };
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return 0;
    };
    let stem = stem.to_lowercase();

    let names = PREFERRED_NAMES
        .iter()
        .map(|name| name.to_string())
        .chain(directory_name.map(str::to_lowercase));
    let mut score: u32 = names
        .zip(1..)
        .filter(|(name, _)| !name.is_empty() && stem.contains(name.as_str()))
        .map(|(_, position)| position)
        .sum();

    score *= weight(PREFERRED_FORMATS, mime);
    score *= weight(PREFERRED_EXTENSIONS, &extension);
    score
}

fn weight(preferred: &[&str], value: &str) -> u32 {
    preferred
        .iter()
        .position(|p| *p == value)
        .map_or(1, |index| (index as u32).max(1))
}
