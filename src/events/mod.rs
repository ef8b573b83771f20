//! Event bus for orchestration status events.
//!
//! Provides a publish/subscribe mechanism for the status notifications the
//! engines emit while scaling systems and fetching remote mounts. Publishing
//! is fire-and-forget: no subscriber, no problem.
//!
//! # Example
//!
//! ```ignore
//! let bus = EventBus::new();
//!
//! // Subscribe to scale events
//! let mut rx = bus.subscribe(vec!["system.scale.*".to_string()]);
//!
//! // Publish an event
//! bus.publish(Event::scale("web", 0, 2));
//!
//! // Receive events
//! while let Some(event) = rx.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! ```

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;
use tracing::debug;

/// Maximum number of events buffered in the broadcast channel.
const EVENT_BUFFER_SIZE: usize = 256;

/// Payload of a status event.
#[derive(Debug, Clone)]
pub enum Status {
    /// A system is being scaled from `from` to `to` daemon instances.
    Scale { system: String, from: usize, to: usize },

    /// A remote mount asset is about to be fetched.
    RemoteFetch {
        system: String,
        /// Mount key the asset belongs to.
        mount: String,
        /// Source URL.
        origin: String,
        /// Host path the asset will land at.
        target: PathBuf,
        /// File name component of the target.
        filename: String,
    },
}

impl Status {
    /// Get the topic string this payload is published under.
    pub fn topic(&self) -> &'static str {
        match self {
            Status::Scale { .. } => "system.scale.status",
            Status::RemoteFetch { .. } => "system.mounts.get_remote.status",
        }
    }
}

/// A status event.
#[derive(Debug, Clone)]
pub struct Event {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Topic string (e.g., "system.scale.status")
    pub topic: String,
    /// Event payload
    pub status: Status,
}

impl Event {
    /// Create a new event from a payload.
    pub fn new(status: Status) -> Self {
        Self {
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as i64,
            topic: status.topic().to_string(),
            status,
        }
    }

    /// Convenience constructor for scale status events.
    pub fn scale(system: &str, from: usize, to: usize) -> Self {
        Self::new(Status::Scale { system: system.to_string(), from, to })
    }
}

/// Event bus for publishing and subscribing to status events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: Event) {
        debug!(topic = %event.topic, "Publishing event");
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to events, optionally filtered by topic patterns.
    ///
    /// # Filter patterns
    ///
    /// - `"system.scale.*"` - All scale events
    /// - `"system.mounts.get_remote.status"` - Only remote fetch events
    /// - Empty list - All events
    pub fn subscribe(&self, filters: Vec<String>) -> EventSubscriber {
        EventSubscriber { receiver: self.sender.subscribe(), filters }
    }

    /// Get the number of current subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Event subscriber with optional filtering.
pub struct EventSubscriber {
    receiver: broadcast::Receiver<Event>,
    filters: Vec<String>,
}

impl EventSubscriber {
    /// Receive the next event (blocking).
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.matches(&event) {
                        return Some(event);
                    }
                    // Event doesn't match filters, continue
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!("Event subscriber lagged by {} events", n);
                    // Continue receiving
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return None;
                }
            }
        }
    }

    /// Check if an event matches the filters.
    fn matches(&self, event: &Event) -> bool {
        // Empty filters = all events
        if self.filters.is_empty() {
            return true;
        }

        for filter in &self.filters {
            // Exact match
            if filter == &event.topic {
                return true;
            }

            // Wildcard match (e.g., "system.scale.*")
            if let Some(prefix) = filter.strip_suffix(".*") {
                if event.topic.starts_with(prefix) {
                    return true;
                }
            }
        }

        false
    }
}
