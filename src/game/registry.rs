use super::messages::{Color, ServerMessage};
use super::session::{ChatEntry, GameSession, SessionState};
use crate::connection::{Connection, ConnectionId};
use dashmap::DashMap;
use tracing::{debug, info};

/// What is left of a session after one of its players disconnected
pub struct DisconnectInfo {
    pub game_id: String,
    pub opponent: Connection<ServerMessage>,
    /// Whether the game was still in progress when the player left
    pub was_active: bool,
}

/// Live sessions plus a per-connection index.
/// A connection maps to at most one session: its most recent one.
pub struct SessionRegistry {
    games: DashMap<String, GameSession>,
    player_games: DashMap<ConnectionId, String>, // connection -> game_id
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            games: DashMap::new(),
            player_games: DashMap::new(),
        }
    }

    /// Track a new session. Any earlier session of either player is ended
    /// and dropped; a player left behind in it is told their opponent is gone.
    pub fn insert(&self, session: GameSession) {
        let game_id = session.id().to_string();
        let players = [
            session.participant(Color::White).id(),
            session.participant(Color::Black).id(),
        ];

        let mut superseded: Vec<String> = Vec::new();
        for player in players {
            if let Some(previous) = self.player_games.insert(player, game_id.clone())
                && previous != game_id
                && !superseded.contains(&previous)
            {
                debug!(game_id = previous, connection_id = %player, "Superseded by a newer game");
                superseded.push(previous);
            }
        }

        for previous in superseded {
            self.retire(&previous, &players);
        }

        self.games.insert(game_id, session);
    }

    /// Drop a superseded game. Participants not moving on to the new game
    /// are unhooked from it, and notified if it was still running.
    fn retire(&self, game_id: &str, moving_on: &[ConnectionId]) {
        let Some((_, mut old)) = self.games.remove(game_id) else {
            return;
        };
        let was_active = old.is_active();
        old.end();

        for color in [Color::White, Color::Black] {
            let player = old.participant(color);
            if moving_on.contains(&player.id()) {
                continue;
            }
            self.player_games
                .remove_if(&player.id(), |_, current| current.as_str() == game_id);
            if was_active {
                player.send(ServerMessage::OpponentDisconnected);
            }
        }
    }

    pub fn game_id_of(&self, id: ConnectionId) -> Option<String> {
        self.player_games.get(&id).map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn state(&self, game_id: &str) -> Option<SessionState> {
        self.games.get(game_id).map(|g| g.state())
    }

    pub fn chat_history(&self, game_id: &str) -> Option<Vec<ChatEntry>> {
        self.games.get(game_id).map(|g| g.chat_history().to_vec())
    }

    pub fn relay_move(&self, from: ConnectionId, mv: serde_json::Value) -> bool {
        let Some(game_id) = self.game_id_of(from) else {
            debug!(connection_id = %from, "Move from player without a game");
            return false;
        };
        let Some(game) = self.games.get(&game_id) else {
            return false;
        };
        game.relay_move(from, mv)
    }

    pub fn relay_chat(&self, from: ConnectionId, text: String, timestamp: u64) -> Option<ChatEntry> {
        let game_id = self.game_id_of(from)?;
        let mut game = self.games.get_mut(&game_id)?;
        game.relay_chat(from, text, timestamp)
    }

    pub fn report_game_over(&self, from: ConnectionId, winner: String) -> bool {
        let Some(game_id) = self.game_id_of(from) else {
            return false;
        };
        let Some(mut game) = self.games.get_mut(&game_id) else {
            return false;
        };
        let relayed = game.report_game_over(from, winner.clone());
        if relayed {
            info!(game_id, winner, "Game over reported");
        }
        relayed
    }

    /// Remove a player from their game due to disconnect.
    /// The session is ended and dropped; the opponent's index entry goes too
    /// unless they have since moved on to another game.
    pub fn remove_player(&self, id: ConnectionId) -> Option<DisconnectInfo> {
        let (_, game_id) = self.player_games.remove(&id)?;
        let (_, mut game) = self.games.remove(&game_id)?;

        let was_active = game.is_active();
        game.end();

        let opponent = game.opponent_of(id)?.clone();
        self.player_games
            .remove_if(&opponent.id(), |_, current| *current == game_id);

        Some(DisconnectInfo {
            game_id,
            opponent,
            was_active,
        })
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
