use super::{Connection, ConnectionId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Outbound message types that can carry a presence count
pub trait PresenceMessage {
    fn presence_count(count: usize) -> Self;
}

/// Every live connection of one service, keyed by the id assigned at accept time
pub struct ConnectionRegistry<M> {
    next_id: AtomicU64,
    connections: DashMap<ConnectionId, Connection<M>>,
}

impl<M: Clone> ConnectionRegistry<M> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            connections: DashMap::new(),
        }
    }

    /// Allocate a fresh connection id and track the new connection
    pub fn open(&self) -> (Connection<M>, broadcast::Receiver<M>) {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (conn, rx) = Connection::new(id);
        self.connections.insert(id, conn.clone());
        (conn, rx)
    }

    pub fn get(&self, id: ConnectionId) -> Option<Connection<M>> {
        self.connections.get(&id).map(|r| r.clone())
    }

    pub fn remove(&self, id: ConnectionId) -> Option<Connection<M>> {
        self.connections.remove(&id).map(|(_, conn)| conn)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Number of tracked connections whose writer is still alive
    pub fn open_count(&self) -> usize {
        self.connections.iter().filter(|c| c.is_open()).count()
    }
}

impl<M: Clone + PresenceMessage> ConnectionRegistry<M> {
    /// Push the current open-connection count to every open connection.
    /// Returns the count that was sent.
    pub fn broadcast_presence(&self) -> usize {
        let count = self.open_count();
        let mut delivered = 0;
        for conn in self.connections.iter() {
            if conn.send(M::presence_count(count)) {
                delivered += 1;
            }
        }
        debug!(count, delivered, "Broadcast presence");
        count
    }
}

impl<M: Clone> Default for ConnectionRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}
