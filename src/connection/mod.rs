mod registry;
mod ws;

pub use registry::{ConnectionRegistry, PresenceMessage};
pub use ws::{ConnectionHandler, run_connection};

use std::fmt;
use tokio::sync::broadcast;

/// Outbound frames buffered per connection before the writer task falls behind
const CHANNEL_CAPACITY: usize = 64;

/// Opaque identity assigned to each accepted connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Handle to one client's outbound message channel.
///
/// Cloning the handle is cheap; every clone feeds the same writer task. The
/// connection counts as open for as long as that writer task holds its
/// receiver.
#[derive(Clone)]
pub struct Connection<M> {
    id: ConnectionId,
    tx: broadcast::Sender<M>,
}

impl<M: Clone> Connection<M> {
    pub fn new(id: ConnectionId) -> (Self, broadcast::Receiver<M>) {
        let (tx, rx) = broadcast::channel(CHANNEL_CAPACITY);
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.tx.receiver_count() > 0
    }

    /// Queue a message for delivery. Returns false if the connection is gone.
    pub fn send(&self, msg: M) -> bool {
        self.tx.send(msg).is_ok()
    }
}

impl<M> fmt::Debug for Connection<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").field("id", &self.id).finish()
    }
}
