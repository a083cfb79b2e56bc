//! Host-side set of attached clients.
//!
//! The registry is the only shared mutable structure in the host. It is
//! guarded by a `tokio::sync::Mutex`; `broadcast` snapshots the entries,
//! releases the lock, sends, then prunes whatever failed. Entries that
//! vanish mid-pass (a receive loop unregistering concurrently) are
//! harmless: removal is idempotent.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::SlateError;

// ── ConnectionId ─────────────────────────────────────────────────

/// Registry-assigned identity of one accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── FrameSink ────────────────────────────────────────────────────

/// Outbound half of a connection, as seen by the registry.
#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Hand one encoded frame to the transport.
    async fn send_frame(&self, frame: Bytes) -> Result<(), SlateError>;
}

/// One registered endpoint.
struct Connection {
    peer: SocketAddr,
    sink: Arc<dyn FrameSink>,
}

/// Outcome of a broadcast. Informational only; nothing here is an error
/// for the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections that accepted the frame.
    pub delivered: usize,
    /// Connections that failed and were removed.
    pub dropped: Vec<ConnectionId>,
}

/// A registered peer, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub id: ConnectionId,
    pub addr: SocketAddr,
}

// ── ConnectionRegistry ───────────────────────────────────────────

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, Connection>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new connection and return its id.
    pub async fn register(&self, peer: SocketAddr, sink: Arc<dyn FrameSink>) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let total = {
            let mut connections = self.connections.lock().await;
            connections.insert(id, Connection { peer, sink });
            connections.len()
        };
        info!(%id, %peer, total, "client registered");
        id
    }

    /// Stop tracking a connection. Safe to call any number of times.
    ///
    /// Returns `true` if the connection was still registered.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let (removed, total) = {
            let mut connections = self.connections.lock().await;
            let removed = connections.remove(&id);
            (removed, connections.len())
        };
        match removed {
            Some(conn) => {
                info!(%id, peer = %conn.peer, total, "client unregistered");
                true
            }
            None => false,
        }
    }

    /// Send one frame to a single connection, removing it on failure.
    pub async fn send_to(&self, id: ConnectionId, frame: Bytes) -> Result<(), SlateError> {
        let sink = {
            let connections = self.connections.lock().await;
            connections.get(&id).map(|c| Arc::clone(&c.sink))
        };
        let Some(sink) = sink else {
            return Err(SlateError::SendFailure(id));
        };
        if let Err(e) = sink.send_frame(frame).await {
            warn!(%id, "send failed: {e}");
            self.unregister(id).await;
            return Err(SlateError::SendFailure(id));
        }
        Ok(())
    }

    /// Send `frame` to every registered connection.
    ///
    /// A failed send removes only that connection and never stops
    /// delivery to the rest.
    pub async fn broadcast(&self, frame: Bytes) -> BroadcastReport {
        let snapshot: Vec<(ConnectionId, Arc<dyn FrameSink>)> = {
            let connections = self.connections.lock().await;
            connections
                .iter()
                .map(|(id, c)| (*id, Arc::clone(&c.sink)))
                .collect()
        };

        let mut report = BroadcastReport::default();
        for (id, sink) in snapshot {
            match sink.send_frame(frame.clone()).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(%id, "{}: {e}", SlateError::SendFailure(id));
                    report.dropped.push(id);
                }
            }
        }

        for id in &report.dropped {
            self.unregister(*id).await;
        }
        debug!(
            delivered = report.delivered,
            dropped = report.dropped.len(),
            bytes = frame.len(),
            "broadcast"
        );
        report
    }

    /// Drop every connection. Each writer flushes what it has queued and
    /// then closes its socket.
    pub async fn disconnect_all(&self) -> usize {
        let drained: Vec<ConnectionId> = {
            let mut connections = self.connections.lock().await;
            connections.drain().map(|(id, _)| id).collect()
        };
        if !drained.is_empty() {
            info!(count = drained.len(), "disconnected all clients");
        }
        drained.len()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.lock().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }

    /// Registered peers, ordered by id.
    pub async fn peers(&self) -> Vec<PeerInfo> {
        let mut peers: Vec<PeerInfo> = {
            let connections = self.connections.lock().await;
            connections
                .iter()
                .map(|(id, c)| PeerInfo {
                    id: *id,
                    addr: c.peer,
                })
                .collect()
        };
        peers.sort_by_key(|p| p.id);
        peers
    }
}

impl fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
