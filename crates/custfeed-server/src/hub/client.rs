//! Per-connection stream handle.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use super::registry::ClientMap;

/// One connected client's receive side of the hub.
///
/// Yields the events broadcast while the handle is registered. Dropping the
/// handle removes its registry entry, so an HTTP disconnect tears the
/// registration down as soon as the response body is released.
pub struct StreamClient {
    /// Registry id of this handle.
    id: u64,
    /// Receive half of the client's event channel.
    rx: mpsc::Receiver<serde_json::Value>,
    /// Registry this handle lives in.
    clients: Arc<ClientMap>,
}

impl StreamClient {
    pub(super) fn new(
        id: u64,
        rx: mpsc::Receiver<serde_json::Value>,
        clients: Arc<ClientMap>,
    ) -> Self {
        Self { id, rx, clients }
    }

    /// Registry id of this client.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Receive the next broadcast event.
    ///
    /// Returns `None` once the registry entry is gone and the buffered
    /// events are drained.
    pub async fn recv(&mut self) -> Option<serde_json::Value> {
        self.rx.recv().await
    }

    /// Receive a buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<serde_json::Value> {
        self.rx.try_recv().ok()
    }
}

impl Stream for StreamClient {
    type Item = serde_json::Value;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        if self.clients.remove(&self.id).is_some() {
            tracing::debug!(
                client_id = self.id,
                clients = self.clients.len(),
                "stream client deregistered"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::BroadcastHub;
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn stream_yields_broadcast_events_in_order() {
        let hub = BroadcastHub::new(4, 4);
        let mut client = hub.register().unwrap();

        hub.broadcast(&json!({"name": "first"}));
        hub.broadcast(&json!({"name": "second"}));

        assert_eq!(client.next().await.unwrap()["name"], "first");
        assert_eq!(client.next().await.unwrap()["name"], "second");
    }
}
