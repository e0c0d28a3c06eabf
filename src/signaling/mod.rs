//! WebRTC signaling relay: peers register a self-chosen id and the server
//! forwards offers, answers and ICE candidates between them.

pub mod messages;
pub mod relay;
mod ws_handler;

pub use relay::SignalingRelay;
pub use ws_handler::{PeerContext, handle_connection};
