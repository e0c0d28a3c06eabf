use crate::game::MatchRules;
use crate::game::matchmaking::{MAX_RATING_DIFFERENCE, WAIT_TIME_TOLERANCE};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_GAME_PORT: u16 = 8080;
const DEFAULT_SIGNALING_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct Config {
    pub game_port: u16,
    pub signaling_port: u16,
    pub max_rating_difference: u32,
    pub wait_time_tolerance: Duration,
    /// CORS origins for the HTTP routes. Empty allows any origin.
    pub allowed_hosts: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            game_port: parse_var("GAME_PORT").unwrap_or(DEFAULT_GAME_PORT),
            signaling_port: parse_var("SIGNALING_PORT").unwrap_or(DEFAULT_SIGNALING_PORT),
            max_rating_difference: parse_var("MAX_RATING_DIFFERENCE")
                .unwrap_or(MAX_RATING_DIFFERENCE),
            wait_time_tolerance: parse_var("WAIT_TIME_TOLERANCE_MS")
                .map(Duration::from_millis)
                .unwrap_or(WAIT_TIME_TOLERANCE),
            allowed_hosts: env::var("ALLOWED_HOSTS")
                .map(|hosts| split_hosts(&hosts))
                .unwrap_or_default(),
        }
    }

    pub fn game_addr(&self) -> String {
        format!("0.0.0.0:{}", self.game_port)
    }

    pub fn signaling_addr(&self) -> String {
        format!("0.0.0.0:{}", self.signaling_port)
    }

    pub fn match_rules(&self) -> MatchRules {
        MatchRules {
            max_rating_difference: self.max_rating_difference,
            wait_time_tolerance: self.wait_time_tolerance,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game_port: DEFAULT_GAME_PORT,
            signaling_port: DEFAULT_SIGNALING_PORT,
            max_rating_difference: MAX_RATING_DIFFERENCE,
            wait_time_tolerance: WAIT_TIME_TOLERANCE,
            allowed_hosts: Vec::new(),
        }
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn split_hosts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(String::from)
        .collect()
}
