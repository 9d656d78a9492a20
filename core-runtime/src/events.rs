//! # Event Bus System
//!
//! Progress reporting for the indexer over `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: [`CoreEvent`] wraps [`IndexEvent`] (pipeline progress) and
//!   [`PlaylistEvent`] (playlist import/export)
//! - **EventBus**: broadcast channel shared by every stage
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! ```text
//! ┌───────────────┐    emit     ┌───────────┐   subscribe   ┌────────────┐
//! │ Indexer       ├────────────>│           ├──────────────>│ UI         │
//! └───────────────┘             │ EventBus  │               └────────────┘
//! ┌───────────────┐    emit     │           │   subscribe   ┌────────────┐
//! │ Playlist I/O  ├────────────>│           ├──────────────>│ Logger     │
//! └───────────────┘             └───────────┘               └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, IndexEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Index(IndexEvent::Progress { loaded: 10, explored: 42 }))
//!     .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Indexing in progress");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Progress
//!   events are superseded by later ones, so lagging is harmless.
//! - **`RecvError::Closed`**: every sender was dropped.
//!
//! Emitting with no subscribers returns `Err`; publishers ignore it with `.ok()`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Indexing pipeline events
    Index(IndexEvent),
    /// Playlist file events
    Playlist(PlaylistEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Index(e) => e.description(),
            CoreEvent::Playlist(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Index(IndexEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Index(IndexEvent::Cancelled { .. }) => EventSeverity::Warning,
            CoreEvent::Index(IndexEvent::Completed { .. }) => EventSeverity::Info,
            CoreEvent::Index(IndexEvent::Started { .. }) => EventSeverity::Info,
            CoreEvent::Playlist(_) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Index Events
// ============================================================================

/// Progress of one indexing run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum IndexEvent {
    /// Run started over these roots.
    Started { roots: Vec<PathBuf> },
    /// Songs loaded so far out of the files explored so far.
    Progress { loaded: u64, explored: u64 },
    /// Exploration finished; linking has no meaningful progress fraction.
    Indeterminate,
    /// Library built.
    Completed {
        songs: u64,
        albums: u64,
        artists: u64,
        genres: u64,
        playlists: u64,
        duration_ms: u64,
    },
    /// Run aborted by a pipeline-level failure.
    Failed { message: String },
    /// Run cancelled; nothing was published.
    Cancelled { loaded: u64, explored: u64 },
}

impl IndexEvent {
    fn description(&self) -> &str {
        match self {
            IndexEvent::Started { .. } => "Indexing started",
            IndexEvent::Progress { .. } => "Indexing in progress",
            IndexEvent::Indeterminate => "Linking library",
            IndexEvent::Completed { .. } => "Indexing completed successfully",
            IndexEvent::Failed { .. } => "Indexing failed",
            IndexEvent::Cancelled { .. } => "Indexing cancelled",
        }
    }
}

// ============================================================================
// Playlist Events
// ============================================================================

/// Playlist file import and export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaylistEvent {
    /// An external playlist file was read.
    Imported {
        path: PathBuf,
        name: Option<String>,
        entries: u64,
    },
    /// A playlist was written to an external file.
    Exported { path: PathBuf, entries: u64 },
}

impl PlaylistEvent {
    fn description(&self) -> &str {
        match self {
            PlaylistEvent::Imported { .. } => "Playlist imported",
            PlaylistEvent::Exported { .. } => "Playlist exported",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let index_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Index(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(loaded: u64, explored: u64) -> CoreEvent {
        CoreEvent::Index(IndexEvent::Progress { loaded, explored })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(CoreEvent::Index(IndexEvent::Indeterminate)).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Index(IndexEvent::Started {
            roots: vec![PathBuf::from("/music")],
        });
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Playlist(_)));

        bus.emit(progress(1, 2)).ok();
        let imported = CoreEvent::Playlist(PlaylistEvent::Imported {
            path: PathBuf::from("/music/mix.m3u"),
            name: Some("Mix".to_string()),
            entries: 12,
        });
        bus.emit(imported.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), imported);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(progress(i, 10)).ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let failed = CoreEvent::Index(IndexEvent::Failed {
            message: "database locked".to_string(),
        });
        assert_eq!(failed.severity(), EventSeverity::Error);

        let cancelled = CoreEvent::Index(IndexEvent::Cancelled {
            loaded: 3,
            explored: 9,
        });
        assert_eq!(cancelled.severity(), EventSeverity::Warning);

        assert_eq!(progress(1, 1).severity(), EventSeverity::Debug);
        assert_eq!(progress(1, 1).description(), "Indexing in progress");
    }

    #[tokio::test]
    async fn test_concurrent_publishers() {
        let bus = EventBus::new(100);
        let mut sub = bus.subscribe();

        let bus1 = bus.clone();
        let bus2 = bus.clone();

        let handle1 = tokio::spawn(async move {
            for i in 0..10 {
                bus1.emit(progress(i, 10)).ok();
            }
        });
        let handle2 = tokio::spawn(async move {
            for i in 0..10 {
                bus2.emit(CoreEvent::Playlist(PlaylistEvent::Exported {
                    path: PathBuf::from(format!("/music/{}.m3u", i)),
                    entries: i,
                }))
                .ok();
            }
        });

        handle1.await.ok();
        handle2.await.ok();

        let mut count = 0;
        while sub.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 20);
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Index(IndexEvent::Completed {
            songs: 120,
            albums: 10,
            artists: 8,
            genres: 4,
            playlists: 2,
            duration_ms: 3_600_000,
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Index\""));
        assert!(json.contains("\"event\":\"Completed\""));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[tokio::test]
    async fn test_try_recv() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());

        bus.emit(CoreEvent::Index(IndexEvent::Indeterminate)).ok();
        let received = stream.try_recv().unwrap().unwrap();
        assert_eq!(received, CoreEvent::Index(IndexEvent::Indeterminate));
    }
}
