//! FIFO matchmaking queue and private room codes.

use std::collections::{HashSet, VecDeque};

use rand::Rng;
use tokio::time::Instant;

use crate::config::ROOM_CODE_LEN;

#[derive(Debug, Clone)]
struct QueueEntry {
    user_id: String,
    joined_at: Instant,
}

/// FIFO queue of players waiting for an opponent, with O(1) de-duplication.
#[derive(Debug, Default)]
pub struct MatchmakingQueue {
    queue: VecDeque<QueueEntry>,
    members: HashSet<String>,
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a player. Returns `false` without touching the queue when the
    /// player already has a pending entry.
    pub fn add(&mut self, user_id: &str) -> bool {
        if self.members.contains(user_id) {
            return false;
        }
        self.members.insert(user_id.to_string());
        self.queue.push_back(QueueEntry {
            user_id: user_id.to_string(),
            joined_at: Instant::now(),
        });
        true
    }

    /// Remove a player entirely (cancel or disconnect).
    pub fn remove(&mut self, user_id: &str) {
        if self.members.remove(user_id) {
            self.queue.retain(|e| e.user_id != user_id);
        }
    }

    /// Pair the two longest-waiting players in arrival order, removing them
    /// from the queue, or `None` when fewer than two are waiting.
    pub fn try_match(&mut self) -> Option<(String, String)> {
        if self.queue.len() < 2 {
            return None;
        }
        let first = self.queue.pop_front().expect("len checked");
        let second = self.queue.pop_front().expect("len checked");
        self.members.remove(&first.user_id);
        self.members.remove(&second.user_id);
        Some((first.user_id, second.user_id))
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.members.contains(user_id)
    }

    /// 0-based FIFO position of a waiting player.
    pub fn position(&self, user_id: &str) -> Option<usize> {
        self.queue.iter().position(|e| e.user_id == user_id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// How long the head of the queue has been waiting, for diagnostics.
    pub fn longest_wait(&self) -> Option<std::time::Duration> {
        self.queue.front().map(|e| e.joined_at.elapsed())
    }
}

const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ0123456789";

/// Generate a short room code.
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_CHARSET[rng.random_range(0..ROOM_CODE_CHARSET.len())] as char)
        .collect()
}

/// Room codes are short uppercase alphanumeric strings.
pub fn is_valid_room_code(code: &str) -> bool {
    code.len() == ROOM_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
