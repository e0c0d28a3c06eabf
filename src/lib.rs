pub mod config;
pub mod connection;
pub mod game;
pub mod signaling;

use axum::{
    Json, Router,
    extract::{State, WebSocketUpgrade, ws::WebSocket},
    http::HeaderValue,
    response::Response,
    routing::get,
};
use config::Config;
use game::GameCoordinator;
use game::time_control::{PRESETS, TimeControl};
use signaling::SignalingRelay;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

async fn health() -> &'static str {
    "ok"
}

async fn time_controls() -> Json<BTreeMap<&'static str, TimeControl>> {
    Json(PRESETS.iter().copied().collect())
}

#[derive(Clone)]
pub struct GameState {
    pub game: Arc<GameCoordinator>,
}

#[derive(Clone)]
pub struct SignalingState {
    pub relay: Arc<SignalingRelay>,
}

async fn game_ws(ws: WebSocketUpgrade, State(state): State<GameState>) -> Response {
    ws.on_upgrade(|socket| handle_game_socket(socket, state))
}

async fn handle_game_socket(socket: WebSocket, state: GameState) {
    game::handle_connection(socket, state.game).await;
}

async fn signaling_ws(ws: WebSocketUpgrade, State(state): State<SignalingState>) -> Response {
    ws.on_upgrade(|socket| handle_signaling_socket(socket, state))
}

async fn handle_signaling_socket(socket: WebSocket, state: SignalingState) {
    signaling::handle_connection(socket, state.relay).await;
}

fn cors_layer(allowed_hosts: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_hosts.is_empty() {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_hosts
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Router for the game coordination service
pub fn game_app(config: &Config) -> Router {
    let state = GameState {
        game: Arc::new(GameCoordinator::new(config.match_rules())),
    };

    Router::new()
        .route("/", get(game_ws))
        .route("/ws", get(game_ws))
        .route("/health", get(health))
        .route("/time-controls", get(time_controls))
        .layer(cors_layer(&config.allowed_hosts))
        .with_state(state)
}

/// Router for the WebRTC signaling service
pub fn signaling_app(config: &Config) -> Router {
    let state = SignalingState {
        relay: Arc::new(SignalingRelay::new()),
    };

    Router::new()
        .route("/", get(signaling_ws))
        .route("/ws", get(signaling_ws))
        .route("/health", get(health))
        .layer(cors_layer(&config.allowed_hosts))
        .with_state(state)
}
