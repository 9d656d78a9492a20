//! # Domain Models
//!
//! Value types shared by every stage of the indexer: file handles, parsed
//! tags, identifiers and the pieces final entities are built from.

pub mod cover;
pub mod date;
pub mod file;
pub mod name;
pub mod release_type;
pub mod tags;
pub mod uid;

pub use cover::{Cover, CoverCollection, CoverId, SingleCover};
pub use date::{Date, DateRange};
pub use file::FileHandle;
pub use name::{Name, Placeholder, Token, TokenKind};
pub use release_type::{Refinement, ReleaseType};
pub use tags::{ParsedTags, ReplayGain};
pub use uid::{parse_mbid, MusicKind, MusicUid, ParseUidError, UidHasher, UidNamespace};
