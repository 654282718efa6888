//! Registry of active client streams and the broadcast fan-out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::client::StreamClient;

/// Map of active client handles keyed by client id. Shared with each
/// [`StreamClient`] so a dropped handle can remove its own entry.
pub(super) type ClientMap = DashMap<u64, mpsc::Sender<serde_json::Value>>;

/// Returned by [`BroadcastHub::register`] when the client limit is reached.
#[derive(Debug, Error)]
#[error("active stream limit reached ({0})")]
pub struct RegistryFull(pub usize);

/// Hub for fanning change events out to connected stream clients.
///
/// Handles are keyed by an id that is never reused, so removal always
/// targets the exact connection it was issued for, never a look-alike.
pub struct BroadcastHub {
    /// Active client handles.
    clients: Arc<ClientMap>,
    /// Next client id.
    next_client_id: AtomicU64,
    /// Maximum number of registered clients.
    max_clients: usize,
    /// Events buffered per client before new events are dropped for it.
    client_buffer: usize,
}

impl BroadcastHub {
    /// Create a new hub.
    pub fn new(max_clients: usize, client_buffer: usize) -> Self {
        Self {
            clients: Arc::new(DashMap::new()),
            next_client_id: AtomicU64::new(1),
            max_clients,
            client_buffer,
        }
    }

    /// Register a new stream client.
    ///
    /// The returned handle receives every event broadcast while it is
    /// registered and deregisters itself when dropped.
    pub fn register(&self) -> Result<StreamClient, RegistryFull> {
        if self.clients.len() >= self.max_clients {
            return Err(RegistryFull(self.max_clients));
        }

        let id = self.next_client_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(self.client_buffer);
        self.clients.insert(id, tx);

        tracing::debug!(
            client_id = id,
            clients = self.clients.len(),
            "stream client registered"
        );

        Ok(StreamClient::new(id, rx, Arc::clone(&self.clients)))
    }

    /// Broadcast one event to every currently registered client.
    ///
    /// Iterates a snapshot taken before the first write, so concurrent
    /// registration and removal never perturb the loop. A client whose
    /// channel has closed is removed; a client whose buffer is full misses
    /// this event but stays registered. Returns the delivery count.
    pub fn broadcast(&self, event: &serde_json::Value) -> usize {
        let targets: Vec<(u64, mpsc::Sender<serde_json::Value>)> = self
            .clients
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut delivered = 0;
        for (id, tx) in targets {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(client_id = id, "client buffer full, dropping event");
                }
                Err(TrySendError::Closed(_)) => {
                    if self.clients.remove(&id).is_some() {
                        tracing::debug!(client_id = id, "removed disconnected stream client");
                    }
                }
            }
        }

        delivered
    }

    /// Number of currently registered clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}
