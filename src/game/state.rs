use super::matchmaking::{MatchRules, MatchmakingQueue, Pairing};
use super::messages::{Color, ServerMessage};
use super::registry::SessionRegistry;
use super::session::GameSession;
use super::time_control::lookup as preset;
use crate::connection::{Connection, ConnectionRegistry};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Everything the game service knows: live connections, the matchmaking
/// queue, and running sessions. One instance per service.
pub struct GameCoordinator {
    pub connections: ConnectionRegistry<ServerMessage>,
    pub sessions: SessionRegistry,
    queue: Mutex<MatchmakingQueue>,
}

impl GameCoordinator {
    pub fn new(rules: MatchRules) -> Self {
        Self {
            connections: ConnectionRegistry::new(),
            sessions: SessionRegistry::new(),
            queue: Mutex::new(MatchmakingQueue::new(rules)),
        }
    }

    fn lock_queue(&self) -> MutexGuard<'_, MatchmakingQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn waiting(&self, time_control: &str) -> usize {
        self.lock_queue().waiting(time_control)
    }

    /// Put a player in the queue for a time control and start a game if a
    /// suitable opponent is waiting.
    pub fn enqueue(&self, conn: &Connection<ServerMessage>, time_control: String, rating: i32) {
        info!(connection_id = %conn.id(), time_control, rating, "Player joining queue");
        {
            let mut queue = self.lock_queue();
            for pairing in queue.enqueue(conn.clone(), time_control, rating, Instant::now()) {
                self.start_game(pairing);
            }
        }
        self.connections.broadcast_presence();
    }

    /// Create the session for a fresh pairing and tell both players.
    /// Runs under the queue lock so the pair is never seen half-started.
    fn start_game(&self, pairing: Pairing) {
        let game_id = uuid::Uuid::new_v4().to_string();
        let Pairing {
            time_control,
            white,
            black,
        } = pairing;

        info!(
            game_id,
            time_control,
            label = preset(&time_control).map(|tc| tc.label),
            white = %white.connection.id(),
            black = %black.connection.id(),
            white_rating = white.rating,
            black_rating = black.rating,
            "Game starting"
        );

        self.sessions.insert(GameSession::new(
            game_id.clone(),
            white.connection.clone(),
            black.connection.clone(),
        ));

        white.connection.send(ServerMessage::GameStart {
            color: Color::White,
            opponent_rating: black.rating,
            time_control: time_control.clone(),
            game_id: game_id.clone(),
        });
        black.connection.send(ServerMessage::GameStart {
            color: Color::Black,
            opponent_rating: white.rating,
            time_control,
            game_id,
        });
    }

    pub fn relay_move(&self, from: &Connection<ServerMessage>, mv: serde_json::Value) {
        if !self.sessions.relay_move(from.id(), mv) {
            debug!(connection_id = %from.id(), "Move not relayed");
        }
    }

    pub fn relay_chat(&self, from: &Connection<ServerMessage>, text: String) {
        if self.sessions.relay_chat(from.id(), text, now_millis()).is_none() {
            debug!(connection_id = %from.id(), "Chat not relayed");
        }
    }

    pub fn report_game_over(&self, from: &Connection<ServerMessage>, winner: String) {
        if !self.sessions.report_game_over(from.id(), winner) {
            debug!(connection_id = %from.id(), "Game over not relayed");
        }
    }

    /// Tear down everything a closed connection took part in. The caller has
    /// already dropped it from the connection registry.
    pub fn disconnect(&self, conn: &Connection<ServerMessage>) {
        let connection_id = conn.id();
        info!(%connection_id, "Player disconnected");

        {
            let mut queue = self.lock_queue();
            for pairing in queue.dequeue(connection_id, Instant::now()) {
                self.start_game(pairing);
            }
        }

        if let Some(closed) = self.sessions.remove_player(connection_id) {
            info!(game_id = closed.game_id, %connection_id, "Session closed by disconnect");
            if closed.was_active {
                closed.opponent.send(ServerMessage::OpponentDisconnected);
            }
        }

        self.connections.broadcast_presence();
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}
