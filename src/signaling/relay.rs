use super::messages::ServerMessage;
use crate::connection::{Connection, ConnectionId, ConnectionRegistry};
use dashmap::DashMap;
use tracing::{debug, info};

/// Routes signaling frames between peers that named themselves with
/// `register`. Peer ids are client-chosen and trusted.
pub struct SignalingRelay {
    pub connections: ConnectionRegistry<ServerMessage>,
    peers: DashMap<String, Connection<ServerMessage>>,
}

impl SignalingRelay {
    pub fn new() -> Self {
        Self {
            connections: ConnectionRegistry::new(),
            peers: DashMap::new(),
        }
    }

    /// Map a peer id to a connection, replacing whatever held it before
    pub fn register(&self, peer_id: &str, conn: &Connection<ServerMessage>) {
        let previous = self.peers.insert(peer_id.to_string(), conn.clone());
        match previous {
            Some(old) if old.id() != conn.id() => {
                info!(peer_id, old = %old.id(), new = %conn.id(), "Peer re-registered from another connection");
            }
            _ => info!(peer_id, connection_id = %conn.id(), "Peer registered"),
        }
    }

    pub fn lookup(&self, peer_id: &str) -> Option<Connection<ServerMessage>> {
        self.peers.get(peer_id).map(|r| r.clone())
    }

    /// Drop a peer id, but only while it still belongs to `owner`. A late
    /// close from a replaced connection leaves the newer registration alone.
    pub fn unregister(&self, peer_id: &str, owner: ConnectionId) -> bool {
        let removed = self
            .peers
            .remove_if(peer_id, |_, conn| conn.id() == owner)
            .is_some();
        if removed {
            info!(peer_id, connection_id = %owner, "Peer unregistered");
        } else {
            debug!(peer_id, connection_id = %owner, "Peer id already taken over, keeping mapping");
        }
        removed
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Forward a frame to a registered peer. Unknown or closed targets are
    /// dropped without telling the sender.
    pub fn relay(&self, target_peer_id: &str, msg: ServerMessage) -> bool {
        let Some(target) = self.lookup(target_peer_id) else {
            debug!(target_peer_id, "Relay target not registered, dropping");
            return false;
        };
        if !target.send(msg) {
            debug!(target_peer_id, "Relay target closed, dropping");
            return false;
        }
        true
    }
}

impl Default for SignalingRelay {
    fn default() -> Self {
        Self::new()
    }
}
