//! Audio Tag Extraction
//!
//! [`LoftyTagReader`] is the default [`TagReader`]: it reads the file through
//! [`FileSystemAccess`], probes it with the `lofty` crate and reports every
//! tag it finds as [`RawTags`], keyed the way each tag family names its
//! fields.
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::extractor::LoftyTagReader;
//! use bridge_traits::TagReader;
//!
//! # async fn example(fs: std::sync::Arc<dyn bridge_traits::FileSystemAccess>) -> bridge_traits::error::Result<()> {
//! let reader = LoftyTagReader::new(fs);
//! let raw = reader.read_tags(std::path::Path::new("song.flac")).await?;
//! println!("Duration: {:?}ms", raw.duration_ms);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{FileSystemAccess, RawTags, TagReader};
use bytes::Bytes;
use lofty::config::ParseOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::PictureType;
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, ItemValue, Tag, TagType};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Tag family a lofty tag is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Id3v2,
    Xiph,
    Mp4,
}

impl Family {
    fn of(tag_type: TagType) -> Family {
        match tag_type {
            TagType::VorbisComments | TagType::Ape => Family::Xiph,
            TagType::Mp4Ilst => Family::Mp4,
            // ID3v1, RIFF INFO and AIFF text chunks are reported through
            // their ID3v2 equivalents
            _ => Family::Id3v2,
        }
    }

    /// Tag type whose key names this family uses
    fn key_type(self, tag_type: TagType) -> TagType {
        match self {
            Family::Id3v2 => TagType::Id3v2,
            _ => tag_type,
        }
    }
}

/// Reads raw tags with `lofty`.
pub struct LoftyTagReader {
    file_system: Arc<dyn FileSystemAccess>,
    parse_options: ParseOptions,
}

impl LoftyTagReader {
    pub fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self::with_options(file_system, ParseOptions::new())
    }

    /// Create a reader with custom parse options
    pub fn with_options(file_system: Arc<dyn FileSystemAccess>, parse_options: ParseOptions) -> Self {
        Self {
            file_system,
            parse_options,
        }
    }

    fn probe(data: &Bytes, parse_options: ParseOptions, path: &Path) -> Result<RawTags> {
        let invalid = |e: lofty::error::LoftyError| {
            BridgeError::InvalidTags(format!("{}: {}", path.display(), e))
        };

        let tagged_file = Probe::new(std::io::Cursor::new(data.as_ref()))
            .options(parse_options)
            .guess_file_type()
            .map_err(|e| BridgeError::InvalidTags(format!("{}: {}", path.display(), e)))?
            .read()
            .map_err(invalid)?;

        let mut raw = RawTags {
            duration_ms: Some(tagged_file.properties().duration().as_millis() as u64),
            ..Default::default()
        };

        // The primary tag is read first so its values lead each key
        let primary = tagged_file.primary_tag_type();
        let mut tags: Vec<&Tag> = tagged_file.tags().iter().collect();
        tags.sort_by_key(|tag| tag.tag_type() != primary);

        for tag in &tags {
            collect_tag(&mut raw, tag);
        }
        raw.cover = front_cover(&tags);

        Ok(raw)
    }
}

#[async_trait]
impl TagReader for LoftyTagReader {
    async fn read_tags(&self, path: &Path) -> Result<RawTags> {
        debug!("Reading tags from: {}", path.display());

        let data = self.file_system.read_file(path).await?;
        let parse_options = self.parse_options;
        let owned_path = path.to_path_buf();

        tokio::task::spawn_blocking(move || Self::probe(&data, parse_options, &owned_path))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Tag reader task failed: {}", e)))?
    }
}

/// Copy every text item of `tag` into the map of its family.
fn collect_tag(raw: &mut RawTags, tag: &Tag) {
    let family = Family::of(tag.tag_type());
    let key_type = family.key_type(tag.tag_type());

    for item in tag.items() {
        if is_position_key(item.key()) {
            continue;
        }
        let Some(key) = item.key().map_key(key_type, true) else {
            continue;
        };
        let value = match item.value() {
            ItemValue::Text(text) | ItemValue::Locator(text) => normalize_text(text),
            ItemValue::Binary(_) => continue,
        };
        push(raw, family, key, value);
    }

    collect_positions(raw, family, tag);
}

fn is_position_key(key: &ItemKey) -> bool {
    matches!(
        key,
        ItemKey::TrackNumber | ItemKey::TrackTotal | ItemKey::DiscNumber | ItemKey::DiscTotal
    )
}

/// lofty splits `n/total` fields into separate items; put them back the way
/// each family stores them.
fn collect_positions(raw: &mut RawTags, family: Family, tag: &Tag) {
    let positions = [
        (tag.track(), tag.track_total(), "TRACKNUMBER", "TRACKTOTAL", "trkn", "TRCK"),
        (tag.disk(), tag.disk_total(), "DISCNUMBER", "DISCTOTAL", "disk", "TPOS"),
    ];

    for (number, total, xiph_number, xiph_total, mp4, id3v2) in positions {
        match family {
            Family::Xiph => {
                if let Some(number) = number {
                    raw.push_xiph(xiph_number, number.to_string());
                }
                if let Some(total) = total {
                    raw.push_xiph(xiph_total, total.to_string());
                }
            }
            Family::Mp4 | Family::Id3v2 => {
                let Some(value) = slash_field(number, total) else {
                    continue;
                };
                if family == Family::Mp4 {
                    raw.push_mp4(mp4, value);
                } else {
                    raw.push_id3v2(id3v2, value);
                }
            }
        }
    }
}

fn slash_field(number: Option<u32>, total: Option<u32>) -> Option<String> {
    match (number, total) {
        (Some(number), Some(total)) => Some(format!("{}/{}", number, total)),
        (Some(number), None) => Some(number.to_string()),
        (None, Some(total)) => Some(format!("0/{}", total)),
        (None, None) => None,
    }
}

fn push(raw: &mut RawTags, family: Family, key: &str, value: String) {
    match family {
        Family::Xiph => raw.push_xiph(key, value),
        Family::Mp4 => raw.push_mp4(key, value),
        Family::Id3v2 if is_frame_id(key) => raw.push_id3v2(key, value),
        // Anything that is not a frame ID came from a user text frame
        Family::Id3v2 => raw.push_id3v2(format!("TXXX:{}", key), value),
    }
}

fn is_frame_id(key: &str) -> bool {
    key.len() == 4
        && key
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// The front cover if any tag has one, otherwise the first picture found
fn front_cover(tags: &[&Tag]) -> Option<Bytes> {
    let pictures = || tags.iter().flat_map(|tag| tag.pictures());
    pictures()
        .find(|picture| picture.pic_type() == PictureType::CoverFront)
        .or_else(|| pictures().next())
        .filter(|picture| !picture.data().is_empty())
        .map(|picture| Bytes::copy_from_slice(picture.data()))
}

/// Normalize text metadata
///
/// - Trims leading/trailing whitespace
/// - Normalizes consecutive whitespace to single space
/// - Removes null bytes and control characters
fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::storage::FileMetadata;
    use std::path::PathBuf;

    struct BytesFileSystem(Bytes);

    #[async_trait]
    impl FileSystemAccess for BytesFileSystem {
        async fn exists(&self, _path: &Path) -> Result<bool> {
            Ok(true)
        }
        async fn metadata(&self, _path: &Path) -> Result<FileMetadata> {
            Ok(FileMetadata {
                size: self.0.len() as u64,
                modified_ms: Some(0),
                is_directory: false,
            })
        }
        async fn create_dir_all(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
        async fn read_file(&self, _path: &Path) -> Result<Bytes> {
            Ok(self.0.clone())
        }
        async fn write_file(&self, _path: &Path, _data: Bytes) -> Result<()> {
            Ok(())
        }
        async fn rename(&self, _from: &Path, _to: &Path) -> Result<()> {
            Ok(())
        }
        async fn delete_file(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
        async fn list_directory(&self, _path: &Path) -> Result<Vec<PathBuf>> {
            Ok(Vec::new())
        }
        async fn open_read_stream(
            &self,
            path: &Path,
        ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>> {
            Err(BridgeError::NotFound(path.to_path_buf()))
        }
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hello   World  "), "Hello World");
        assert_eq!(normalize_text("Test\0String"), "TestString");
        assert_eq!(normalize_text("Line1\nLine2\tTab"), "Line1 Line2 Tab");
    }

    #[test]
    fn test_vorbis_tag_keys() {
        let mut tag = Tag::new(TagType::VorbisComments);
        tag.set_title("Avril 14th".to_string());
        tag.set_artist("Aphex Twin".to_string());
        tag.insert_text(ItemKey::AlbumArtist, "Aphex Twin".to_string());
        tag.set_track(4);
        tag.set_track_total(26);

        let mut raw = RawTags::default();
        collect_tag(&mut raw, &tag);

        assert_eq!(raw.xiph.get("TITLE"), Some(&vec!["Avril 14th".to_string()]));
        assert_eq!(raw.xiph.get("ALBUMARTIST"), Some(&vec!["Aphex Twin".to_string()]));
        assert_eq!(raw.xiph.get("TRACKNUMBER"), Some(&vec!["4".to_string()]));
        assert_eq!(raw.xiph.get("TRACKTOTAL"), Some(&vec!["26".to_string()]));
        assert!(raw.id3v2.is_empty());
    }

    #[test]
    fn test_id3v2_positions_use_slash_form() {
        let mut tag = Tag::new(TagType::Id3v2);
        tag.set_title("Idioteque".to_string());
        tag.set_track(8);
        tag.set_track_total(10);
        tag.set_disk(1);

        let mut raw = RawTags::default();
        collect_tag(&mut raw, &tag);

        assert_eq!(raw.id3v2.get("TIT2"), Some(&vec!["Idioteque".to_string()]));
        assert_eq!(raw.id3v2.get("TRCK"), Some(&vec!["8/10".to_string()]));
        assert_eq!(raw.id3v2.get("TPOS"), Some(&vec!["1".to_string()]));
    }

    #[test]
    fn test_user_text_keys() {
        let mut raw = RawTags::default();
        push(&mut raw, Family::Id3v2, "MusicBrainz Album Id", "x".to_string());
        push(&mut raw, Family::Id3v2, "TPE1", "y".to_string());

        assert!(raw.id3v2.contains_key("TXXX:MusicBrainz Album Id"));
        assert!(raw.id3v2.contains_key("TPE1"));
    }

    #[test]
    fn test_slash_field() {
        assert_eq!(slash_field(Some(3), Some(12)).as_deref(), Some("3/12"));
        assert_eq!(slash_field(Some(3), None).as_deref(), Some("3"));
        assert_eq!(slash_field(None, None), None);
    }

    #[tokio::test]
    async fn test_unreadable_container_is_invalid_tags() {
        let fs = Arc::new(BytesFileSystem(Bytes::from_static(b"definitely not audio")));
        let reader = LoftyTagReader::new(fs);

        let result = reader.read_tags(Path::new("/music/broken.mp3")).await;
        assert!(matches!(result, Err(BridgeError::InvalidTags(_))));
    }
}
