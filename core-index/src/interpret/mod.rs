//! # Interpretation
//!
//! Turns the raw tags of a run into a linked [`Library`](core_library::Library).
//!
//! - [`pre`]: per-song interpretation with naming, separator and fallback rules
//! - [`separators`] and [`id3`]: multi-value splitting and ID3 genre codes
//! - [`linker`]: grouping songs into genres, artists and albums
//! - [`interpreter`]: assembling final entities from the linked groups

pub mod id3;
pub mod interpreter;
pub mod linker;
pub mod pre;
pub mod separators;

pub use interpreter::Interpreter;
pub use pre::{PreAlbum, PreArtist, PreGenre, PreSong, TagInterpreter};
pub use separators::Separators;
