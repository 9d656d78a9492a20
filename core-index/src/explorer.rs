//! # File Explorer
//!
//! Walks the music roots through [`FileSystemAccess`] and streams every audio
//! file it finds as a [`FileHandle`]. Directories are visited depth-first in
//! path order so two walks over an unchanged tree yield the same sequence.

use bridge_traits::storage::FileSystemAccess;
use core_library::models::FileHandle;
use core_runtime::config::IndexerConfig;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::{IndexError, Result};
use crate::stage::{self, Progress};

pub struct FileExplorer {
    file_system: Arc<dyn FileSystemAccess>,
    /// Lowercase, without the leading dot
    audio_extensions: HashSet<String>,
}

impl FileExplorer {
    pub fn new<I, S>(file_system: Arc<dyn FileSystemAccess>, audio_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            file_system,
            audio_extensions: audio_extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &IndexerConfig) -> Self {
        Self::new(Arc::clone(&config.file_system), &config.audio_extensions)
    }

    fn is_audio(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.audio_extensions.contains(&ext.to_ascii_lowercase()))
    }

    /// Send every audio file under `roots` to `sink`.
    ///
    /// Missing roots and unreadable directories are skipped with a warning.
    /// Returns how many files were sent.
    #[instrument(skip_all, fields(roots = roots.len()))]
    pub async fn explore(
        &self,
        roots: &[PathBuf],
        sink: &mpsc::Sender<FileHandle>,
        progress: &Progress,
        token: &CancellationToken,
    ) -> Result<u64> {
        let mut found = 0u64;
        for root in roots {
            if !self.file_system.exists(root).await? {
                warn!(root = %root.display(), "Music root does not exist, skipping");
                continue;
            }
            found += self.walk(root, sink, progress, token).await?;
        }
        debug!(found, "Exploration finished");
        Ok(found)
    }

    async fn walk(
        &self,
        root: &Path,
        sink: &mpsc::Sender<FileHandle>,
        progress: &Progress,
        token: &CancellationToken,
    ) -> Result<u64> {
        let mut found = 0u64;
        let mut pending = vec![root.to_path_buf()];

        while let Some(directory) = pending.pop() {
            if token.is_cancelled() {
                return Err(IndexError::Cancelled);
            }

            let mut entries = match self.file_system.list_directory(&directory).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(directory = %directory.display(), error = %e, "Failed to list directory");
                    continue;
                }
            };
            entries.sort();

            let mut subdirectories = Vec::new();
            for path in entries {
                let metadata = match self.file_system.metadata(&path).await {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to stat file");
                        continue;
                    }
                };

                if metadata.is_directory {
                    subdirectories.push(path);
                } else if self.is_audio(&path) {
                    let file = FileHandle::new(
                        path,
                        root,
                        metadata.modified_ms.unwrap_or(0),
                        metadata.size,
                    );
                    stage::send(sink, file, token, "explore").await?;
                    progress.file_explored();
                    found += 1;
                }
            }

            // Reversed so the stack pops them in path order
            pending.extend(subdirectories.into_iter().rev());
        }

        Ok(found)
    }
}
