use super::messages::ServerMessage;
use crate::connection::{Connection, ConnectionId};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

pub const MAX_RATING_DIFFERENCE: u32 = 200;
pub const WAIT_TIME_TOLERANCE: Duration = Duration::from_millis(30_000);

/// Thresholds used when deciding whether two queued players may be paired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRules {
    pub max_rating_difference: u32,
    /// Once either player has waited longer than this, any rating gap is accepted
    pub wait_time_tolerance: Duration,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            max_rating_difference: MAX_RATING_DIFFERENCE,
            wait_time_tolerance: WAIT_TIME_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueuedPlayer {
    pub connection: Connection<ServerMessage>,
    pub time_control: String,
    pub rating: i32,
    pub joined_at: Instant,
}

impl QueuedPlayer {
    fn waited_longer_than(&self, tolerance: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.joined_at) > tolerance
    }
}

/// Two players taken out of the queue together. White is the lower rated one.
#[derive(Debug)]
pub struct Pairing {
    pub time_control: String,
    pub white: QueuedPlayer,
    pub black: QueuedPlayer,
}

/// Waiting players, bucketed by time control (pure, no transport concerns)
pub struct MatchmakingQueue {
    rules: MatchRules,
    buckets: HashMap<String, Vec<QueuedPlayer>>,
}

impl MatchmakingQueue {
    pub fn new(rules: MatchRules) -> Self {
        Self {
            rules,
            buckets: HashMap::new(),
        }
    }

    /// Queue a player and try to match within their time control.
    /// A connection that is already queued loses its previous entry first,
    /// and any other bucket it left is re-scanned too.
    pub fn enqueue(
        &mut self,
        connection: Connection<ServerMessage>,
        time_control: String,
        rating: i32,
        now: Instant,
    ) -> Vec<Pairing> {
        let left = self.remove_everywhere(connection.id());

        self.buckets
            .entry(time_control.clone())
            .or_default()
            .push(QueuedPlayer {
                connection,
                time_control: time_control.clone(),
                rating,
                joined_at: now,
            });

        let mut pairings: Vec<Pairing> = left
            .into_iter()
            .filter(|tc| *tc != time_control)
            .filter_map(|tc| self.try_match(&tc, now))
            .collect();
        pairings.extend(self.try_match(&time_control, now));
        pairings
    }

    /// Remove a connection from every bucket, re-running the matcher on each
    /// bucket it was waiting in.
    pub fn dequeue(&mut self, id: ConnectionId, now: Instant) -> Vec<Pairing> {
        self.remove_everywhere(id)
            .into_iter()
            .filter_map(|time_control| self.try_match(&time_control, now))
            .collect()
    }

    /// Number of players waiting for a time control
    pub fn waiting(&self, time_control: &str) -> usize {
        self.buckets.get(time_control).map_or(0, Vec::len)
    }

    pub fn total_waiting(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.buckets
            .values()
            .flatten()
            .any(|p| p.connection.id() == id)
    }

    /// Returns the time controls the connection was removed from
    fn remove_everywhere(&mut self, id: ConnectionId) -> Vec<String> {
        let mut removed_from = Vec::new();
        for (time_control, bucket) in self.buckets.iter_mut() {
            let before = bucket.len();
            bucket.retain(|p| p.connection.id() != id);
            if bucket.len() != before {
                removed_from.push(time_control.clone());
            }
        }
        self.buckets.retain(|_, bucket| !bucket.is_empty());
        removed_from
    }

    /// Pair at most one couple from the bucket. Further pairs wait for the
    /// next change to the bucket.
    fn try_match(&mut self, time_control: &str, now: Instant) -> Option<Pairing> {
        let bucket = self.buckets.get_mut(time_control)?;

        bucket.retain(|p| p.connection.is_open());
        if bucket.len() < 2 {
            if bucket.is_empty() {
                self.buckets.remove(time_control);
            }
            return None;
        }

        bucket.sort_by_key(|p| p.rating);

        let index = best_pair_index(bucket, &self.rules, now)?;
        let mut pair = bucket.drain(index..index + 2);
        let (white, black) = (pair.next()?, pair.next()?);
        drop(pair);

        debug!(
            time_control,
            white_rating = white.rating,
            black_rating = black.rating,
            remaining = bucket.len(),
            "Paired players"
        );

        if bucket.is_empty() {
            self.buckets.remove(time_control);
        }

        Some(Pairing {
            time_control: time_control.to_string(),
            white,
            black,
        })
    }
}

/// Index of the left element of the eligible adjacent pair with the smallest
/// rating gap. Expects `bucket` sorted by rating. Earliest pair wins ties.
fn best_pair_index(bucket: &[QueuedPlayer], rules: &MatchRules, now: Instant) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;

    for (i, pair) in bucket.windows(2).enumerate() {
        let rating_diff = pair[0].rating.abs_diff(pair[1].rating);
        let waited_too_long = pair
            .iter()
            .any(|p| p.waited_longer_than(rules.wait_time_tolerance, now));

        let eligible = rating_diff <= rules.max_rating_difference || waited_too_long;
        if eligible && best.is_none_or(|(_, smallest)| rating_diff < smallest) {
            best = Some((i, rating_diff));
        }
    }

    best.map(|(i, _)| i)
}
