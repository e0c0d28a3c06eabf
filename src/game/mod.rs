pub mod matchmaking;
pub mod messages;
pub mod registry;
pub mod session;
pub mod state;
pub mod time_control;
mod ws_handler;

pub use matchmaking::MatchRules;
pub use state::GameCoordinator;
pub use ws_handler::handle_connection;
