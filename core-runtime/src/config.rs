//! # Indexer Configuration Module
//!
//! Configuration for one indexing setup: where the music lives, where the
//! library database and cover blobs go, and how tags are interpreted.
//!
//! ## Overview
//!
//! The builder constructs an [`IndexerConfig`] holding every setting plus the
//! bridge implementations the pipeline needs. It validates eagerly so a bad
//! setup fails before any file is touched.
//!
//! ## Required Settings
//!
//! - At least one music root
//! - Database path
//! - Cover directory
//!
//! ## Bridges
//!
//! - `FileSystemAccess` - required (desktop default: `TokioFileSystem` when the
//!   `desktop-shims` feature is enabled)
//! - `TagReader` - optional; the indexer falls back to the lofty-backed reader
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{IndexerConfig, NamingMode};
//!
//! let config = IndexerConfig::builder()
//!     .root("/home/me/Music")
//!     .database_path("/home/me/.local/share/indexer/library.db")
//!     .cover_dir("/home/me/.cache/indexer/covers")
//!     .separators(";/")
//!     .naming(NamingMode::Intelligent)
//!     .build()?;
//! # Ok::<(), core_runtime::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{FileSystemAccess, TagReader};
use std::path::PathBuf;
use std::sync::Arc;

/// Characters allowed as multi-value separators
pub const SEPARATOR_CHARS: &str = ",;/+&";

/// Default bound for every inter-stage channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Default number of concurrent tag extraction workers
pub const DEFAULT_EXTRACT_WORKERS: usize = 8;

const MAX_CHANNEL_CAPACITY: usize = 65_536;
const MAX_EXTRACT_WORKERS: usize = 64;

/// Audio extensions scanned when none are configured
pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "oga", "opus", "m4a", "aac", "wav", "wave", "wma", "alac", "aiff",
    "aif", "ape", "wv",
];

/// How names are turned into sort keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingMode {
    /// Strip punctuation and leading articles, compare digit runs numerically
    #[default]
    Intelligent,
    /// Strip punctuation only
    Simple,
}

/// Encoded format of transcoded cover blobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverFormat {
    Jpeg,
    Png,
}

impl CoverFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            CoverFormat::Jpeg => "jpg",
            CoverFormat::Png => "png",
        }
    }
}

/// How cover bytes are stored in the blob directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverTranscoding {
    /// Store the embedded bytes untouched
    None,
    /// Downscale to fit `resolution` and re-encode
    Compress {
        format: CoverFormat,
        resolution: u32,
        quality: u8,
    },
}

impl Default for CoverTranscoding {
    fn default() -> Self {
        CoverTranscoding::Compress {
            format: CoverFormat::Jpeg,
            resolution: 750,
            quality: 80,
        }
    }
}

/// User-facing tag interpretation settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Interpretation {
    pub naming: NamingMode,
    /// Characters that split single-valued multi-value tags
    pub separators: String,
}

/// Indexer configuration.
///
/// Use [`IndexerConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct IndexerConfig {
    /// Directories that are walked for audio files
    pub roots: Vec<PathBuf>,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Directory for content-addressed cover blobs
    pub cover_dir: PathBuf,

    /// Bound of every inter-stage channel
    pub channel_capacity: usize,

    /// Concurrent tag extraction workers
    pub extract_workers: usize,

    /// Lower-case file extensions treated as audio
    pub audio_extensions: Vec<String>,

    pub interpretation: Interpretation,

    pub cover_transcoding: CoverTranscoding,

    /// Capacity of the progress event broadcast channel
    pub event_buffer_size: usize,

    /// File system access abstraction
    pub file_system: Arc<dyn FileSystemAccess>,

    /// Native tag reader (optional, lofty fallback)
    pub tag_reader: Option<Arc<dyn TagReader>>,
}

impl std::fmt::Debug for IndexerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexerConfig")
            .field("roots", &self.roots)
            .field("database_path", &self.database_path)
            .field("cover_dir", &self.cover_dir)
            .field("channel_capacity", &self.channel_capacity)
            .field("extract_workers", &self.extract_workers)
            .field("audio_extensions", &self.audio_extensions)
            .field("interpretation", &self.interpretation)
            .field("cover_transcoding", &self.cover_transcoding)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("file_system", &"FileSystemAccess { ... }")
            .field(
                "tag_reader",
                &self.tag_reader.as_ref().map(|_| "TagReader { ... }"),
            )
            .finish()
    }
}

impl IndexerConfig {
    /// Creates a new builder for constructing an `IndexerConfig`.
    pub fn builder() -> IndexerConfigBuilder {
        IndexerConfigBuilder::default()
    }

    /// Whether `extension` (without the dot) is a scanned audio extension
    pub fn is_audio_extension(&self, extension: &str) -> bool {
        let extension = extension.to_ascii_lowercase();
        self.audio_extensions.iter().any(|e| *e == extension)
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.roots.is_empty() {
            return Err(Error::Config(
                "Music roots are required. Use .root() to add one.".to_string(),
            ));
        }

        if self.roots.iter().any(|root| root.as_os_str().is_empty()) {
            return Err(Error::Config("Music root cannot be empty".to_string()));
        }

        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        if self.cover_dir.as_os_str().is_empty() {
            return Err(Error::Config("Cover directory cannot be empty".to_string()));
        }

        if self.channel_capacity == 0 {
            return Err(Error::Config(
                "Channel capacity must be greater than 0".to_string(),
            ));
        }

        if self.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(Error::Config(format!(
                "Channel capacity exceeds maximum of {}",
                MAX_CHANNEL_CAPACITY
            )));
        }

        if self.extract_workers == 0 {
            return Err(Error::Config(
                "Extract workers must be greater than 0".to_string(),
            ));
        }

        if self.extract_workers > MAX_EXTRACT_WORKERS {
            return Err(Error::Config(format!(
                "Extract workers exceeds maximum of {}",
                MAX_EXTRACT_WORKERS
            )));
        }

        if self.audio_extensions.is_empty() {
            return Err(Error::Config(
                "At least one audio extension is required".to_string(),
            ));
        }

        if let Some(bad) = self
            .interpretation
            .separators
            .chars()
            .find(|c| !SEPARATOR_CHARS.contains(*c))
        {
            return Err(Error::Config(format!(
                "Unsupported separator '{}'. Allowed separators: {}",
                bad, SEPARATOR_CHARS
            )));
        }

        if let CoverTranscoding::Compress {
            resolution,
            quality,
            ..
        } = self.cover_transcoding
        {
            if resolution == 0 {
                return Err(Error::Config(
                    "Cover resolution must be greater than 0".to_string(),
                ));
            }
            if quality == 0 || quality > 100 {
                return Err(Error::Config(
                    "Cover quality must be between 1 and 100".to_string(),
                ));
            }
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn file_system_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "FileSystemAccess".to_string(),
        message: "FileSystemAccess implementation is required to walk music roots. \
                  Desktop: enable the `desktop-shims` feature. \
                  Mobile: inject a platform-native adapter with .file_system()."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    Ok(Arc::new(bridge_desktop::TokioFileSystem::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    Err(file_system_missing_error())
}

/// Builder for [`IndexerConfig`].
#[derive(Default)]
pub struct IndexerConfigBuilder {
    roots: Vec<PathBuf>,
    database_path: Option<PathBuf>,
    cover_dir: Option<PathBuf>,
    channel_capacity: Option<usize>,
    extract_workers: Option<usize>,
    audio_extensions: Option<Vec<String>>,
    naming: Option<NamingMode>,
    separators: Option<String>,
    cover_transcoding: Option<CoverTranscoding>,
    event_buffer_size: Option<usize>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    tag_reader: Option<Arc<dyn TagReader>>,
}

impl IndexerConfigBuilder {
    /// Adds a music root directory.
    pub fn root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.roots.push(path.into());
        self
    }

    /// Adds several music root directories.
    pub fn roots<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Sets the SQLite database path (required).
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Sets the cover blob directory (required).
    pub fn cover_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cover_dir = Some(path.into());
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    pub fn extract_workers(mut self, workers: usize) -> Self {
        self.extract_workers = Some(workers);
        self
    }

    /// Replaces the scanned audio extensions. Leading dots are ignored.
    pub fn audio_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.audio_extensions = Some(
            extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        );
        self
    }

    pub fn naming(mut self, naming: NamingMode) -> Self {
        self.naming = Some(naming);
        self
    }

    /// Sets the multi-value separator characters, e.g. `";/"`.
    pub fn separators(mut self, separators: impl Into<String>) -> Self {
        self.separators = Some(separators.into());
        self
    }

    pub fn cover_transcoding(mut self, transcoding: CoverTranscoding) -> Self {
        self.cover_transcoding = Some(transcoding);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Injects the file system bridge.
    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Injects a native tag reader.
    pub fn tag_reader(mut self, reader: Arc<dyn TagReader>) -> Self {
        self.tag_reader = Some(reader);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No root, database path or cover directory was provided
    /// - No file system bridge is available
    /// - Any value fails validation
    pub fn build(self) -> Result<IndexerConfig> {
        let database_path = self.database_path.ok_or_else(|| {
            Error::Config("Database path is required. Use .database_path() to set it.".to_string())
        })?;

        let cover_dir = self.cover_dir.ok_or_else(|| {
            Error::Config("Cover directory is required. Use .cover_dir() to set it.".to_string())
        })?;

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system()?,
        };

        let config = IndexerConfig {
            roots: self.roots,
            database_path,
            cover_dir,
            channel_capacity: self.channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY),
            extract_workers: self.extract_workers.unwrap_or(DEFAULT_EXTRACT_WORKERS),
            audio_extensions: self.audio_extensions.unwrap_or_else(|| {
                DEFAULT_AUDIO_EXTENSIONS
                    .iter()
                    .map(|e| e.to_string())
                    .collect()
            }),
            interpretation: Interpretation {
                naming: self.naming.unwrap_or_default(),
                separators: self.separators.unwrap_or_default(),
            },
            cover_transcoding: self.cover_transcoding.unwrap_or_default(),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            file_system,
            tag_reader: self.tag_reader,
        };

        config.validate()?;

        Ok(config)
    }
}
