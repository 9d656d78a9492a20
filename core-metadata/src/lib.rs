//! # Metadata Module
//!
//! Turns audio files into normalized tags and stored covers.
//!
//! ## Overview
//!
//! This module handles:
//! - Raw tag extraction with `lofty` ([`LoftyTagReader`])
//! - Normalizing raw ID3v2, Vorbis and MP4 fields into `ParsedTags` ([`TagParser`])
//! - The content-addressed cover store and cover transcoding ([`CoverCache`])
//! - The ordered chain of cover sources ([`CoverSources`])

pub mod covers;
pub mod error;
pub mod extractor;
pub mod parser;

pub use covers::{
    CoverCache, CoverCandidate, CoverSource, CoverSources, FolderCoverSource, StoredBlob,
};
pub use error::{MetadataError, Result};
pub use extractor::LoftyTagReader;
pub use parser::TagParser;
