//! In-process fan-out of [`WorkflowEvent`]s.
//!
//! The service and executor publish; the stdio host subscribes when it runs
//! with `--events`. Nothing is buffered for receivers that do not exist yet.

use maestro_types::event::WorkflowEvent;
use tokio::sync::broadcast;

/// Shared handle to one broadcast channel. Clones publish to the same
/// subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<WorkflowEvent>,
}

impl EventBus {
    /// `capacity` bounds how far a slow subscriber may fall behind before it
    /// observes `Lagged`. Zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.sender.subscribe()
    }

    /// Returns how many subscribers the event reached; zero when nobody
    /// listens.
    pub fn publish(&self, event: WorkflowEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}
