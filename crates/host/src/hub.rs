//! Fan-out of pushed events to every open `/events` stream

use std::sync::Arc;

use settings_sync_protocol::ServerEvent;
use tokio::sync::{broadcast, watch};

#[derive(Debug, Clone)]
pub struct EventHub {
    tx: broadcast::Sender<ServerEvent>,
    stopping: Arc<watch::Sender<bool>>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        let (stopping, _) = watch::channel(false);
        Self {
            tx,
            stopping: Arc::new(stopping),
        }
    }

    /// Publish to all current subscribers. Returns how many received it.
    pub fn publish(&self, event: ServerEvent) -> usize {
        tracing::debug!(kind = %event.kind, "publishing event");
        // No subscribers is not an error: nobody has a page open
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Ends every open stream, letting graceful shutdown complete
    pub fn shut_down(&self) {
        self.stopping.send_replace(true);
    }

    /// Resolves once `shut_down` has been called
    pub async fn stopped(&self) {
        let mut rx = self.stopping.subscribe();
        // Sender lives in self, so this only errors if it were dropped
        let _ = rx.wait_for(|stopping| *stopping).await;
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(64)
    }
}
