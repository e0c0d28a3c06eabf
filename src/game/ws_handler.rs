use super::messages::{ClientMessage, ServerMessage};
use super::state::GameCoordinator;
use crate::connection::{Connection, ConnectionHandler, ConnectionRegistry, run_connection};
use axum::extract::ws::WebSocket;
use std::sync::Arc;
use tracing::debug;

impl ConnectionHandler for GameCoordinator {
    type Inbound = ClientMessage;
    type Outbound = ServerMessage;
    type Context = ();

    fn connections(&self) -> &ConnectionRegistry<ServerMessage> {
        &self.connections
    }

    fn handle_connect(&self, _conn: &Connection<ServerMessage>) {
        self.connections.broadcast_presence();
    }

    fn handle_message(&self, msg: ClientMessage, conn: &Connection<ServerMessage>, _ctx: &mut ()) {
        match msg {
            ClientMessage::InitGame {
                time_control,
                rating,
            } => self.enqueue(conn, time_control, rating),
            ClientMessage::Move { r#move } => self.relay_move(conn, r#move),
            ClientMessage::Chat {
                game_id,
                player_color,
                data,
            } => {
                debug!(game_id, ?player_color, "Chat from client");
                self.relay_chat(conn, data);
            }
            ClientMessage::GameOver { winner, game_id } => {
                debug!(game_id, winner, "Game over claimed by client");
                self.report_game_over(conn, winner);
            }
        }
    }

    fn handle_disconnect(&self, conn: &Connection<ServerMessage>, _ctx: ()) {
        self.disconnect(conn);
    }

    fn name(&self) -> &'static str {
        "game"
    }
}

pub async fn handle_connection(socket: WebSocket, state: Arc<GameCoordinator>) {
    run_connection(socket, state).await;
}
