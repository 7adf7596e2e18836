//! Broadcast event bus for distributing `SessionEvent` to multiple subscribers.
//!
//! Built on `tokio::sync::broadcast`, the `SessionEventBus` supports multiple
//! concurrent subscribers. Publishing with no active subscribers is a no-op.

use palaver_types::event::SessionEvent;
use tokio::sync::broadcast;

/// Multi-consumer event bus for session changes.
///
/// Cloning the bus clones the sender, allowing multiple producers and consumers.
#[derive(Clone)]
pub struct SessionEventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for SessionEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for SessionEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}
