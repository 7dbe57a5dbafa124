//! Fan execution events out over a `tokio::sync::broadcast` channel.

use relay_application::ports::execution_events::ExecutionEventSink;
use relay_domain::ExecutionEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of events a slow subscriber may lag behind.
pub const DEFAULT_CAPACITY: usize = 256;

/// Sink that forwards every event to all current subscribers.
///
/// Emitting never blocks. Events sent while nobody is subscribed are dropped,
/// and a subscriber that falls more than `capacity` events behind observes
/// `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<ExecutionEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ExecutionEventSink for BroadcastEventSink {
    fn emit(&self, event: ExecutionEvent) {
        if self.sender.send(event).is_err() {
            trace!("No subscribers for execution event");
        }
    }
}
