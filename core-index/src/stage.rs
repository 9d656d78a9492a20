//! Plumbing shared by the pipeline stages: cancellable channel operations
//! and progress counters.

use core_runtime::events::{CoreEvent, EventBus, IndexEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::error::{IndexError, Result};

/// Emit a progress event every this many loaded songs
const PROGRESS_INTERVAL: u64 = 10;

/// Send `item` downstream, giving up when the run is cancelled.
///
/// A closed receiver means the consuming stage is gone; that stage reports
/// its own error, so this one only needs to stop.
pub(crate) async fn send<T>(
    sender: &mpsc::Sender<T>,
    item: T,
    token: &CancellationToken,
    stage: &'static str,
) -> Result<()> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(IndexError::Cancelled),
        sent = sender.send(item) => sent.map_err(|_| IndexError::Stage {
            stage,
            message: "downstream stage stopped".to_string(),
        }),
    }
}

/// Next item from upstream, or `None` once upstream has finished.
pub(crate) async fn recv<T>(
    receiver: &mut mpsc::Receiver<T>,
    token: &CancellationToken,
) -> Result<Option<T>> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(IndexError::Cancelled),
        item = receiver.recv() => Ok(item),
    }
}

/// [`recv`] for a receiver shared between workers.
pub(crate) async fn recv_shared<T>(
    receiver: &Mutex<mpsc::Receiver<T>>,
    token: &CancellationToken,
) -> Result<Option<T>> {
    let mut receiver = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(IndexError::Cancelled),
        guard = receiver.lock() => guard,
    };
    recv(&mut receiver, token).await
}

/// Counters of one indexing run, shared by every stage.
#[derive(Clone)]
pub struct Progress {
    explored: Arc<AtomicU64>,
    loaded: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
    event_bus: EventBus,
}

impl Progress {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            explored: Arc::new(AtomicU64::new(0)),
            loaded: Arc::new(AtomicU64::new(0)),
            failed: Arc::new(AtomicU64::new(0)),
            event_bus,
        }
    }

    pub fn file_explored(&self) {
        self.explored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn song_loaded(&self) {
        let loaded = self.loaded.fetch_add(1, Ordering::Relaxed) + 1;
        if loaded % PROGRESS_INTERVAL == 0 {
            self.emit_progress();
        }
    }

    pub fn file_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn explored(&self) -> u64 {
        self.explored.load(Ordering::Relaxed)
    }

    pub fn loaded(&self) -> u64 {
        self.loaded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn emit_progress(&self) {
        self.event_bus
            .emit(CoreEvent::Index(IndexEvent::Progress {
                loaded: self.loaded(),
                explored: self.explored(),
            }))
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_and_recv_stop_on_cancel() {
        let token = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel::<u32>(1);

        send(&tx, 1, &token, "test").await.unwrap();
        assert_eq!(recv(&mut rx, &token).await.unwrap(), Some(1));

        token.cancel();
        assert!(matches!(
            send(&tx, 2, &token, "test").await,
            Err(IndexError::Cancelled)
        ));
        assert!(matches!(
            recv(&mut rx, &token).await,
            Err(IndexError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_send_to_closed_receiver_fails() {
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::channel::<u32>(1);
        drop(rx);

        let result = send(&tx, 1, &token, "explore").await;
        assert!(matches!(result, Err(IndexError::Stage { stage: "explore", .. })));
    }

    #[tokio::test]
    async fn test_recv_shared_sees_end_of_stream() {
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::channel::<u32>(2);
        let rx = Mutex::new(rx);
        tx.send(7).await.unwrap();
        drop(tx);

        assert_eq!(recv_shared(&rx, &token).await.unwrap(), Some(7));
        assert_eq!(recv_shared(&rx, &token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_progress_emits_every_interval() {
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let progress = Progress::new(bus);

        for _ in 0..PROGRESS_INTERVAL {
            progress.file_explored();
            progress.song_loaded();
        }
        progress.file_failed();

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            CoreEvent::Index(IndexEvent::Progress {
                loaded: PROGRESS_INTERVAL,
                explored: PROGRESS_INTERVAL,
            })
        );
        assert_eq!(progress.failed(), 1);
    }
}
