//! In-process broadcast of assignment events. Publication is fire-and-
//! forget: a send with no active receivers is not an error, and the
//! engine never waits on delivery.

use async_trait::async_trait;
use domain::{AssignmentEvent, EventSink};
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct BroadcastEventSink {
    tx: broadcast::Sender<AssignmentEvent>,
}

impl BroadcastEventSink {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AssignmentEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for BroadcastEventSink {
    async fn publish(&self, event: AssignmentEvent) {
        let _ = self.tx.send(event);
    }
}
