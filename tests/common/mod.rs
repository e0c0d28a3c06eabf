#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use knightwire::config::Config;

pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

pub struct TestServer {
    addr: String,
}

impl TestServer {
    pub fn ws_url(&self) -> String {
        format!("ws://{}/", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn spawn_game_server() -> TestServer {
    spawn_game_server_with_config(Config::default()).await
}

pub async fn spawn_game_server_with_config(config: Config) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let app = knightwire::game_app(&config);
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        addr: addr.to_string(),
    }
}

pub async fn spawn_signaling_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let app = knightwire::signaling_app(&Config::default());
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        addr: addr.to_string(),
    }
}

pub async fn connect(server: &TestServer) -> WsStream {
    let (ws, _) = connect_async(server.ws_url()).await.expect("Failed to connect");
    ws
}

pub async fn send_json(ws: &mut WsStream, value: Value) {
    ws.send(Message::Text(value.to_string().into())).await.unwrap();
}

pub fn init_game_msg(time_control: &str, rating: i32) -> Value {
    json!({"type": "init_game", "payload": {"timeControl": time_control, "rating": rating}})
}

pub fn move_msg(mv: Value) -> Value {
    json!({"type": "move", "payload": {"move": mv}})
}

pub fn chat_msg(game_id: &str, color: &str, data: &str) -> Value {
    json!({"type": "chat", "payload": {"gameId": game_id, "playerColor": color, "data": data}})
}

pub fn game_over_msg(game_id: &str, winner: &str) -> Value {
    json!({"type": "game_over", "payload": {"winner": winner, "gameId": game_id}})
}

pub fn register_msg(peer_id: &str) -> Value {
    json!({"type": "register", "peerId": peer_id})
}

pub fn offer_msg(target: &str, sdp: &str) -> Value {
    json!({"type": "createOffer", "targetPeerId": target, "sdp": {"type": "offer", "sdp": sdp}})
}

async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for message")
            .expect("Connection closed")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

fn is_presence(value: &Value) -> bool {
    value["type"] == "presence_count"
}

/// Next message that is not a presence broadcast
pub async fn recv<T: DeserializeOwned>(ws: &mut WsStream) -> T {
    loop {
        let value = next_json(ws).await;
        if !is_presence(&value) {
            return serde_json::from_value(value).unwrap();
        }
    }
}

fn presence_count(value: &Value) -> usize {
    let count = if value.get("payload").is_some() {
        &value["payload"]["count"]
    } else {
        &value["count"]
    };
    count.as_u64().unwrap() as usize
}

/// Next presence broadcast, failing on anything else
pub async fn recv_presence(ws: &mut WsStream) -> usize {
    let value = next_json(ws).await;
    assert!(is_presence(&value), "Expected presence_count, got {value}");
    presence_count(&value)
}

/// Skip presence broadcasts until one reports `expected`
pub async fn wait_for_presence(ws: &mut WsStream, expected: usize) {
    loop {
        let value = next_json(ws).await;
        if is_presence(&value) && presence_count(&value) == expected {
            return;
        }
    }
}

/// Assert nothing but presence broadcasts arrives for a short while
pub async fn assert_quiet(ws: &mut WsStream) {
    let deadline = tokio::time::Instant::now() + QUIET_PERIOD;
    loop {
        match tokio::time::timeout_at(deadline, ws.next()).await {
            Err(_) => return,
            Ok(None) => panic!("Connection closed"),
            Ok(Some(msg)) => {
                let msg = msg.unwrap();
                let Message::Text(text) = msg else { continue };
                let value: Value = serde_json::from_str(&text).unwrap();
                assert!(is_presence(&value), "Unexpected message: {value}");
            }
        }
    }
}

/// Connect to the signaling server and register. Returns once the
/// registration's presence broadcast came back, so the peer id is live.
pub async fn register_peer(server: &TestServer, peer_id: &str) -> WsStream {
    let mut ws = connect(server).await;
    send_json(&mut ws, register_msg(peer_id)).await;
    recv_presence(&mut ws).await;
    ws
}
