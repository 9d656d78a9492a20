//! # Indexing Pipeline
//!
//! Wires the stages of one indexing run together:
//!
//! ```text
//! explore ──▶ cache read ──┬── hits ───────────────────────────┐
//!                          └── misses ──▶ extract (N workers) ──▶ cache write ──▶ interpret
//! ```
//!
//! Each arrow is a bounded channel of `channel_capacity`. Every stage runs as
//! its own task and watches the run's cancellation token on each send and
//! receive. The first stage to fail cancels the others, and the run returns
//! that stage's error with no library.

use bridge_traits::time::SystemClock;
use core_library::db::{create_pool, DatabaseConfig};
use core_library::repositories::{
    SqlitePlaylistRepository, SqliteStoredCoverRepository, SqliteTagCacheRepository,
};
use core_library::{Library, StoredPlaylists};
use core_metadata::{CoverCache, CoverSources, FolderCoverSource, LoftyTagReader};
use core_runtime::config::{IndexerConfig, Interpretation};
use core_runtime::events::{CoreEvent, EventBus, IndexEvent};
use sqlx::SqlitePool;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::cache::{CacheResult, TagCache};
use crate::error::{IndexError, Result};
use crate::explorer::FileExplorer;
use crate::extract::{Extractor, RawSong};
use crate::interpret::Interpreter;
use crate::playlist::PlaylistImporter;
use crate::stage::{self, Progress};

/// The outcome of a successful run.
pub struct LibraryResult {
    pub library: Library,
    covers: CoverCache,
}

impl LibraryResult {
    /// Delete stored cover blobs that no song of this library uses.
    ///
    /// Only call this once the library is the one being shown. An older
    /// library still in use may reference blobs this removes.
    pub async fn cleanup(&self) -> Result<usize> {
        let removed = self
            .covers
            .cleanup(&self.library.stored_cover_ids())
            .await?;
        info!(removed, "Cleaned up unused covers");
        Ok(removed)
    }

    pub fn into_library(self) -> Library {
        self.library
    }
}

impl fmt::Debug for LibraryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryResult")
            .field("library", &self.library)
            .finish_non_exhaustive()
    }
}

/// Indexes the configured roots into a [`Library`].
///
/// An `Indexer` can run any number of times; each run reads the tag cache
/// left by the previous ones and produces a fresh library.
pub struct Indexer {
    roots: Vec<PathBuf>,
    channel_capacity: usize,
    extract_workers: usize,
    interpretation: Interpretation,
    explorer: Arc<FileExplorer>,
    tag_cache: Arc<TagCache>,
    extractor: Arc<Extractor>,
    cover_cache: CoverCache,
    covers: CoverSources,
    playlists: Arc<StoredPlaylists>,
    importer: Arc<PlaylistImporter>,
    event_bus: EventBus,
}

impl Indexer {
    /// Build an indexer over an existing pool.
    ///
    /// Tags are read by the configured reader, or by lofty when none is set.
    /// Covers are identified from embedded art first and from image files
    /// next to the song second.
    pub fn new(config: IndexerConfig, pool: SqlitePool, event_bus: EventBus) -> Result<Self> {
        config.validate()?;

        let file_system = Arc::clone(&config.file_system);
        let tag_reader = config
            .tag_reader
            .clone()
            .unwrap_or_else(|| Arc::new(LoftyTagReader::new(Arc::clone(&file_system))));

        let cover_cache = CoverCache::new(
            Arc::clone(&file_system),
            Arc::new(SqliteStoredCoverRepository::new(pool.clone())),
            config.cover_dir.clone(),
            config.cover_transcoding,
        );
        let covers = CoverSources::default()
            .with(Arc::new(cover_cache.clone()))
            .with(Arc::new(FolderCoverSource::new(Arc::clone(&file_system))));

        let playlists = StoredPlaylists::new(
            Arc::new(SqlitePlaylistRepository::new(pool.clone())),
            Arc::new(SystemClock),
        );

        Ok(Self {
            explorer: Arc::new(FileExplorer::from_config(&config)),
            tag_cache: Arc::new(TagCache::new(Arc::new(SqliteTagCacheRepository::new(pool)))),
            extractor: Arc::new(Extractor::new(tag_reader, covers.clone())),
            importer: Arc::new(PlaylistImporter::new(file_system, event_bus.clone())),
            playlists: Arc::new(playlists),
            roots: config.roots,
            channel_capacity: config.channel_capacity,
            extract_workers: config.extract_workers,
            interpretation: config.interpretation,
            cover_cache,
            covers,
            event_bus,
        })
    }

    /// Open the configured database and build an indexer with its own
    /// event bus.
    pub async fn open(config: IndexerConfig) -> Result<Self> {
        // Cache reads, cache writes, and one cover write per extract worker
        let connections = u32::try_from(config.extract_workers + 2).unwrap_or(u32::MAX);
        let database = DatabaseConfig::new(&config.database_path).max_connections(connections);
        let pool = create_pool(database).await?;
        let event_bus = EventBus::new(config.event_buffer_size);
        Self::new(config, pool, event_bus)
    }

    pub fn events(&self) -> &EventBus {
        &self.event_bus
    }

    /// Cover sources, for opening the covers songs point to.
    pub fn covers(&self) -> &CoverSources {
        &self.covers
    }

    pub fn playlists(&self) -> &StoredPlaylists {
        &self.playlists
    }

    pub fn importer(&self) -> &PlaylistImporter {
        &self.importer
    }

    /// Index every root into a new library.
    ///
    /// Failures of single files are logged and skipped. A storage failure,
    /// or cancellation of `token`, ends the run without a library; tag
    /// cache entries written before that point stay valid.
    #[instrument(skip(self, token), fields(roots = self.roots.len()))]
    pub async fn run(&self, token: CancellationToken) -> Result<LibraryResult> {
        let started = Instant::now();
        self.event_bus
            .emit(CoreEvent::Index(IndexEvent::Started {
                roots: self.roots.clone(),
            }))
            .ok();

        let progress = Progress::new(self.event_bus.clone());
        match self.execute(&progress, token).await {
            Ok(library) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                info!(
                    songs = library.songs().len(),
                    failed = progress.failed(),
                    duration_ms,
                    "Indexing completed"
                );
                self.event_bus
                    .emit(CoreEvent::Index(IndexEvent::Completed {
                        songs: library.songs().len() as u64,
                        albums: library.albums().len() as u64,
                        artists: library.artists().len() as u64,
                        genres: library.genres().len() as u64,
                        playlists: library.playlists().len() as u64,
                        duration_ms,
                    }))
                    .ok();
                Ok(LibraryResult {
                    library,
                    covers: self.cover_cache.clone(),
                })
            }
            Err(IndexError::Cancelled) => {
                info!(loaded = progress.loaded(), "Indexing cancelled");
                self.event_bus
                    .emit(CoreEvent::Index(IndexEvent::Cancelled {
                        loaded: progress.loaded(),
                        explored: progress.explored(),
                    }))
                    .ok();
                Err(IndexError::Cancelled)
            }
            Err(e) => {
                error!("Indexing failed: {}", e);
                self.event_bus
                    .emit(CoreEvent::Index(IndexEvent::Failed {
                        message: e.to_string(),
                    }))
                    .ok();
                Err(e)
            }
        }
    }

    async fn execute(&self, progress: &Progress, token: CancellationToken) -> Result<Library> {
        // Stages share a child token so a failing stage stops its siblings
        // without cancelling the caller's token.
        let token = token.child_token();

        info!("Phase 1: Loading songs from {} roots", self.roots.len());
        let songs = self.load_songs(progress, &token).await?;
        progress.emit_progress();

        info!("Phase 2: Reading stored playlists");
        let playlists = self.playlists.read().await?;
        if token.is_cancelled() {
            return Err(IndexError::Cancelled);
        }

        info!("Phase 3: Linking {} songs", songs.len());
        self.event_bus
            .emit(CoreEvent::Index(IndexEvent::Indeterminate))
            .ok();
        let interpreter = Interpreter::new(&self.interpretation);
        let library = tokio::task::spawn_blocking(move || interpreter.interpret(songs, playlists))
            .await
            .map_err(|e| IndexError::Stage {
                stage: "interpret",
                message: e.to_string(),
            })?;

        if token.is_cancelled() {
            return Err(IndexError::Cancelled);
        }
        Ok(library)
    }

    /// Run the streaming stages and collect every song they produce.
    async fn load_songs(&self, progress: &Progress, token: &CancellationToken) -> Result<Vec<RawSong>> {
        let capacity = self.channel_capacity;
        let (files_tx, mut files_rx) = mpsc::channel(capacity);
        let (misses_tx, misses_rx) = mpsc::channel(capacity);
        let (extracted_tx, mut extracted_rx) = mpsc::channel::<RawSong>(capacity);
        let (songs_tx, mut songs_rx) = mpsc::channel(capacity);

        let mut stages = JoinSet::new();

        let explorer = Arc::clone(&self.explorer);
        let roots = self.roots.clone();
        let explore_progress = progress.clone();
        spawn_stage(&mut stages, token, "explore", move |token| async move {
            explorer
                .explore(&roots, &files_tx, &explore_progress, &token)
                .await?;
            Ok(())
        });

        let cache = Arc::clone(&self.tag_cache);
        let hits_tx = songs_tx.clone();
        spawn_stage(&mut stages, token, "cache-read", move |token| async move {
            while let Some(file) = stage::recv(&mut files_rx, &token).await? {
                match cache.read(file).await? {
                    CacheResult::Hit(song) => stage::send(&hits_tx, song, &token, "cache-read").await?,
                    CacheResult::Miss(file) => {
                        stage::send(&misses_tx, file, &token, "cache-read").await?
                    }
                }
            }
            Ok(())
        });

        let misses_rx = Arc::new(Mutex::new(misses_rx));
        for worker in 0..self.extract_workers {
            let extractor = Arc::clone(&self.extractor);
            let misses_rx = Arc::clone(&misses_rx);
            let extracted_tx = extracted_tx.clone();
            let progress = progress.clone();
            spawn_stage(&mut stages, token, "extract", move |token| async move {
                while let Some(file) = stage::recv_shared(&misses_rx, &token).await? {
                    let path = file.path.clone();
                    match extractor.extract(file).await {
                        Ok(song) => stage::send(&extracted_tx, song, &token, "extract").await?,
                        Err(e) if e.is_file_failure() => {
                            warn!(worker, path = %path.display(), error = %e, "Skipping unreadable file");
                            progress.file_failed();
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(())
            });
        }
        drop(extracted_tx);

        let cache = Arc::clone(&self.tag_cache);
        spawn_stage(&mut stages, token, "cache-write", move |token| async move {
            while let Some(song) = stage::recv(&mut extracted_rx, &token).await? {
                cache.write(&song).await?;
                stage::send(&songs_tx, song, &token, "cache-write").await?;
            }
            Ok(())
        });

        let mut songs = Vec::new();
        let mut errors = Vec::new();
        loop {
            match stage::recv(&mut songs_rx, token).await {
                Ok(Some(song)) => {
                    songs.push(song);
                    progress.song_loaded();
                }
                Ok(None) => break,
                Err(e) => {
                    errors.push(e);
                    break;
                }
            }
        }
        drop(songs_rx);

        while let Some(joined) = stages.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => errors.push(e),
                Err(e) => {
                    token.cancel();
                    errors.push(IndexError::Stage {
                        stage: "pipeline",
                        message: e.to_string(),
                    });
                }
            }
        }

        match root_cause(errors) {
            Some(e) => Err(e),
            None => Ok(songs),
        }
    }
}

impl fmt::Debug for Indexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Indexer")
            .field("roots", &self.roots)
            .field("channel_capacity", &self.channel_capacity)
            .field("extract_workers", &self.extract_workers)
            .finish_non_exhaustive()
    }
}

/// Spawn a stage that cancels the run when it fails.
fn spawn_stage<S, F>(
    stages: &mut JoinSet<Result<()>>,
    token: &CancellationToken,
    name: &'static str,
    stage: S,
) where
    S: FnOnce(CancellationToken) -> F,
    F: Future<Output = Result<()>> + Send + 'static,
{
    let token = token.clone();
    let stage = stage(token.clone());
    stages.spawn(async move {
        let result = stage.await;
        if let Err(e) = &result {
            if !matches!(e, IndexError::Cancelled) {
                warn!(stage = name, error = %e, "Stage failed");
            }
            token.cancel();
        }
        result
    });
}

/// The error that ended a run.
///
/// Once one stage fails the others stop with `Cancelled`, or with a stage
/// error when they find their neighbour gone. Neither is the cause.
fn root_cause(errors: Vec<IndexError>) -> Option<IndexError> {
    let rank = |e: &IndexError| match e {
        IndexError::Cancelled => 2,
        IndexError::Stage { .. } => 1,
        _ => 0,
    };
    errors.into_iter().min_by_key(rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_library::LibraryError;

    #[test]
    fn test_root_cause_prefers_storage_errors() {
        let errors = vec![
            IndexError::Cancelled,
            IndexError::Stage {
                stage: "extract",
                message: "downstream stage stopped".into(),
            },
            IndexError::Library(LibraryError::Migration("disk full".into())),
            IndexError::Cancelled,
        ];
        assert!(matches!(root_cause(errors), Some(IndexError::Library(_))));
    }

    #[test]
    fn test_root_cause_of_cancelled_run() {
        assert!(matches!(
            root_cause(vec![IndexError::Cancelled, IndexError::Cancelled]),
            Some(IndexError::Cancelled)
        ));
        assert!(root_cause(Vec::new()).is_none());
    }
}
