//! Store notification subscription and hand-off to the broadcast hub.
//!
//! One dedicated connection (never drawn from the query pool) issues
//! `LISTEN` on the customer change channel. Payloads are forwarded over an
//! internal channel to a processor task that parses them and drives the
//! hub, which keeps the fan-out logic testable without a store connection.

use std::sync::Arc;

use sqlx::postgres::PgListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::hub::BroadcastHub;

/// Channel the store publishes customer changes on.
pub const NOTIFY_CHANNEL: &str = "customers_update";

/// Buffer size for the listener-to-processor channel.
const NOTIFY_BUFFER: usize = 64;

/// Processor bridging raw notification payloads to the hub.
pub struct NotificationProcessor {
    /// Receiver for raw notification payloads.
    rx: mpsc::Receiver<String>,
    /// Hub driving the client fan-out.
    hub: Arc<BroadcastHub>,
}

impl NotificationProcessor {
    /// Create a new processor.
    pub fn new(rx: mpsc::Receiver<String>, hub: Arc<BroadcastHub>) -> Self {
        Self { rx, hub }
    }

    /// Run the processor until the channel closes.
    pub async fn run(mut self) {
        info!("notification processor started");

        while let Some(payload) = self.rx.recv().await {
            self.process(&payload);
        }

        info!("notification processor stopped (channel closed)");
    }

    /// Parse one payload and broadcast it.
    ///
    /// A payload that is not valid JSON is dropped with a warning; one bad
    /// event must not stall the stream for connected clients.
    fn process(&self, payload: &str) {
        match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(event) => {
                let delivered = self.hub.broadcast(&event);
                debug!(delivered, "broadcast customer change");
            }
            Err(err) => {
                warn!(error = %err, "dropping malformed notification payload");
            }
        }
    }
}

/// Create the listener-to-processor channel.
pub fn channel() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    mpsc::channel(NOTIFY_BUFFER)
}

/// Start a processor task and return the sender feeding it.
pub fn start_processor(hub: Arc<BroadcastHub>) -> mpsc::Sender<String> {
    let (tx, rx) = channel();
    let processor = NotificationProcessor::new(rx, hub);

    tokio::spawn(async move {
        processor.run().await;
    });

    tx
}

/// Subscribe to the store's notification channel and forward payloads.
///
/// Opens its own connection; the query pool is never used for the
/// subscription. `PgListener` re-establishes the connection and re-issues
/// `LISTEN` after a drop, losing whatever was raised in between. A fatal
/// receive error ends the subscription: queries keep serving, live updates
/// cease.
pub async fn listen(database_url: &str, tx: mpsc::Sender<String>) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect(database_url).await?;
    listener.listen(NOTIFY_CHANNEL).await?;
    info!(channel = NOTIFY_CHANNEL, "subscribed to store notifications");

    loop {
        let notification = listener.recv().await?;
        if tx.send(notification.payload().to_owned()).await.is_err() {
            // Processor gone; nothing left to feed.
            return Ok(());
        }
    }
}

/// Spawn the subscription and its processor for the lifetime of the process.
pub fn start(database_url: String, hub: Arc<BroadcastHub>) {
    let tx = start_processor(hub);

    tokio::spawn(async move {
        if let Err(err) = listen(&database_url, tx).await {
            error!(error = %err, "store notification subscription ended");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn processor_forwards_parsed_payloads() {
        let hub = Arc::new(BroadcastHub::new(4, 4));
        let mut client = hub.register().unwrap();
        let tx = start_processor(Arc::clone(&hub));

        tx.send(r#"{"name":"Acme"}"#.to_string()).await.unwrap();

        assert_eq!(client.recv().await.unwrap(), json!({"name": "Acme"}));
    }

    #[tokio::test]
    async fn malformed_payload_is_skipped() {
        let hub = Arc::new(BroadcastHub::new(4, 4));
        let mut client = hub.register().unwrap();
        let tx = start_processor(Arc::clone(&hub));

        tx.send("not json".to_string()).await.unwrap();
        tx.send(r#"{"name":"after"}"#.to_string()).await.unwrap();

        // The bad payload was dropped; the one behind it still arrives.
        assert_eq!(client.recv().await.unwrap(), json!({"name": "after"}));
    }

    #[tokio::test]
    async fn processor_stops_when_channel_closes() {
        let hub = Arc::new(BroadcastHub::new(4, 4));
        let (tx, rx) = channel();
        let processor = NotificationProcessor::new(rx, hub);
        let handle = tokio::spawn(async move {
            processor.run().await;
        });

        drop(tx);
        handle.await.unwrap();
    }
}
