use super::messages::{ClientMessage, ServerMessage};
use super::relay::SignalingRelay;
use crate::connection::{Connection, ConnectionHandler, ConnectionRegistry, run_connection};
use axum::extract::ws::WebSocket;
use std::sync::Arc;
use tracing::debug;

/// The peer id this connection registered under, if any
#[derive(Debug, Default)]
pub struct PeerContext {
    peer_id: Option<String>,
}

impl ConnectionHandler for SignalingRelay {
    type Inbound = ClientMessage;
    type Outbound = ServerMessage;
    type Context = PeerContext;

    fn connections(&self) -> &ConnectionRegistry<ServerMessage> {
        &self.connections
    }

    fn handle_message(
        &self,
        msg: ClientMessage,
        conn: &Connection<ServerMessage>,
        ctx: &mut PeerContext,
    ) {
        match msg {
            ClientMessage::Register { peer_id } => {
                if let Some(old) = ctx.peer_id.take()
                    && old != peer_id
                {
                    self.unregister(&old, conn.id());
                }
                self.register(&peer_id, conn);
                ctx.peer_id = Some(peer_id);
                self.connections.broadcast_presence();
            }
            ClientMessage::CreateOffer {
                sdp,
                target_peer_id,
            } => {
                self.relay(
                    &target_peer_id,
                    ServerMessage::CreateOffer {
                        sdp,
                        sender_peer_id: ctx.peer_id.clone(),
                    },
                );
            }
            ClientMessage::CreateAnswer {
                sdp,
                target_peer_id,
            } => {
                self.relay(
                    &target_peer_id,
                    ServerMessage::CreateAnswer {
                        sdp,
                        sender_peer_id: ctx.peer_id.clone(),
                    },
                );
            }
            ClientMessage::IceCandidate {
                candidate,
                target_peer_id,
            } => {
                self.relay(
                    &target_peer_id,
                    ServerMessage::IceCandidate {
                        candidate,
                        sender_peer_id: ctx.peer_id.clone(),
                    },
                );
            }
            ClientMessage::Disconnect {
                target_peer_id,
                player_color,
            } => {
                debug!(target_peer_id, ?player_color, "Peer left the call");
                self.relay(
                    &target_peer_id,
                    ServerMessage::Disconnect {
                        player_color,
                        sender_peer_id: ctx.peer_id.clone(),
                    },
                );
            }
        }
    }

    fn handle_disconnect(&self, conn: &Connection<ServerMessage>, ctx: PeerContext) {
        if let Some(peer_id) = ctx.peer_id {
            self.unregister(&peer_id, conn.id());
        }
        self.connections.broadcast_presence();
    }

    fn name(&self) -> &'static str {
        "signaling"
    }
}

pub async fn handle_connection(socket: WebSocket, state: Arc<SignalingRelay>) {
    run_connection(socket, state).await;
}
