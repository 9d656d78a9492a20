//! Integration tests for tag extraction
//!
//! Audio files are generated into a temporary directory and read back
//! through the desktop file system bridge.

use bridge_desktop::TokioFileSystem;
use bridge_traits::error::BridgeError;
use bridge_traits::TagReader;
use core_library::models::FileHandle;
use core_metadata::{LoftyTagReader, TagParser};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn reader() -> LoftyTagReader {
    LoftyTagReader::new(Arc::new(TokioFileSystem::new()))
}

/// One second of silent 16-bit mono PCM at 8 kHz, with no tags.
fn silent_wav() -> Vec<u8> {
    let sample_rate: u32 = 8_000;
    let data_len: u32 = sample_rate * 2;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(44 + data_len as usize, 0);
    wav
}

#[tokio::test]
async fn test_read_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = reader().read_tags(&dir.path().join("nonexistent.mp3")).await;
    assert!(result.is_err(), "Should fail for missing file");
}

#[tokio::test]
async fn test_read_corrupted_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corrupt.mp3");
    std::fs::write(&path, b"This is not a valid audio file").unwrap();

    let result = reader().read_tags(&path).await;
    assert!(matches!(result, Err(BridgeError::InvalidTags(_))));
}

#[tokio::test]
async fn test_untagged_wav_parses_from_file_name() {
    let dir = TempDir::new().unwrap();
    let album = dir.path().join("Field Recordings");
    std::fs::create_dir_all(&album).unwrap();
    let path = album.join("03 Rain.wav");
    std::fs::write(&path, silent_wav()).unwrap();

    let raw = reader().read_tags(&path).await.unwrap();
    assert!(raw.is_empty());
    assert!(raw.cover.is_none());
    let duration = raw.duration_ms.unwrap();
    assert!((990..=1010).contains(&duration), "duration was {duration}ms");

    let file = FileHandle::new(&path, dir.path(), 0, 0);
    let tags = TagParser::new().parse(&file, &raw).unwrap();
    assert_eq!(tags.name, None);
    assert_eq!(tags.name_or_file(&file), Some("03 Rain"));
    assert_eq!(tags.album_name_or_directory(&file), Some("Field Recordings"));
    assert_eq!(tags.duration_ms, duration);
}

#[tokio::test]
async fn test_nameless_file_is_rejected() {
    let raw = bridge_traits::RawTags::default();
    let file = FileHandle::new(Path::new("/music/ .wav"), "/music", 0, 0);
    assert!(TagParser::new().parse(&file, &raw).is_err());
}
