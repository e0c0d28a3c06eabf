use super::{Connection, ConnectionId, ConnectionRegistry};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, StreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Trait for handling WebSocket messages and disconnections.
/// Implement this for each service (game coordination, signaling).
pub trait ConnectionHandler: Send + Sync + 'static {
    type Inbound: DeserializeOwned + Debug + Send;
    type Outbound: Serialize + Clone + Debug + Send + Sync + 'static;
    /// Per-connection state owned by the receive loop
    type Context: Default + Send;

    /// Registry the connection is tracked in for its lifetime
    fn connections(&self) -> &ConnectionRegistry<Self::Outbound>;

    /// Called once the connection is registered, before any message is read
    fn handle_connect(&self, _conn: &Connection<Self::Outbound>) {}

    /// Handle one parsed client message. Must not block.
    fn handle_message(
        &self,
        msg: Self::Inbound,
        conn: &Connection<Self::Outbound>,
        ctx: &mut Self::Context,
    );

    /// Called after the connection has been removed from the registry
    fn handle_disconnect(&self, conn: &Connection<Self::Outbound>, ctx: Self::Context);

    /// Name for logging purposes
    fn name(&self) -> &'static str;
}

/// Run a WebSocket connection with the given handler.
/// Outbound messages are drained by a writer task; inbound frames are
/// handled one at a time, in arrival order, until either side goes away.
pub async fn run_connection<H: ConnectionHandler>(socket: WebSocket, handler: Arc<H>) {
    let (conn, rx) = handler.connections().open();
    let connection_id = conn.id();
    info!(%connection_id, "New {} WebSocket connection", handler.name());

    let (sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(write_outbound(connection_id, rx, sender));

    handler.handle_connect(&conn);

    let mut ctx = H::Context::default();
    loop {
        tokio::select! {
            _ = &mut send_task => break,
            frame = receiver.next() => {
                let Some(Ok(frame)) = frame else { break };
                dispatch(handler.as_ref(), frame, &conn, &mut ctx);
            }
        }
    }

    send_task.abort();
    handler.connections().remove(connection_id);
    handler.handle_disconnect(&conn, ctx);

    info!(%connection_id, "{} WebSocket connection closed", handler.name());
}

/// Drain queued server messages into the socket. A client that falls more
/// than a full channel behind is cut off rather than silently missing frames.
async fn write_outbound<M, S>(
    connection_id: ConnectionId,
    mut rx: broadcast::Receiver<M>,
    mut sink: S,
) where
    M: Serialize + Clone + Debug,
    S: Sink<Message> + Unpin,
{
    loop {
        let msg = match rx.recv().await {
            Ok(msg) => msg,
            Err(RecvError::Lagged(skipped)) => {
                warn!(%connection_id, skipped, "Client fell behind, closing connection");
                break;
            }
            Err(RecvError::Closed) => break,
        };
        debug!(%connection_id, ?msg, "Sending message to client");
        let json = match serde_json::to_string(&msg) {
            Ok(json) => json,
            Err(err) => {
                warn!(%connection_id, %err, "Failed to serialize server message");
                continue;
            }
        };
        if sink.send(Message::Text(json)).await.is_err() {
            break;
        }
    }
}

fn dispatch<H: ConnectionHandler>(
    handler: &H,
    frame: Message,
    conn: &Connection<H::Outbound>,
    ctx: &mut H::Context,
) {
    let Message::Text(text) = frame else {
        debug!("Received non-text message, ignoring");
        return;
    };

    debug!(connection_id = %conn.id(), raw = %text, "Received message");

    let Ok(msg) = serde_json::from_str::<H::Inbound>(&text) else {
        warn!(raw = %text, "Failed to parse client message");
        return;
    };

    handler.handle_message(msg, conn, ctx);
}
