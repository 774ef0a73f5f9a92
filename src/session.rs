//! Session registry: connection phases, private rooms, per-game locks,
//! bot strategies and broadcast fan-out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::bot::BotStrategy;
use crate::config::ROOM_TTL;
use crate::error::{GameError, GameResult};
use crate::matchmaking::{generate_room_code, MatchmakingQueue};
use crate::protocol::{ClientMessage, ServerMessage};

/// Explicit state machine for one connection. Every intent handler guards
/// on the permitted phases before touching any game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Unauthenticated,
    Authenticated,
    Queued,
    RoomPending,
    Placement,
    Battle,
    Finished,
}

impl ConnectionPhase {
    /// Transition table: which intents the current phase accepts.
    pub fn permits(&self, msg: &ClientMessage) -> bool {
        use ConnectionPhase::*;
        match msg {
            ClientMessage::Init { .. } => matches!(self, Unauthenticated),
            ClientMessage::JoinQueue => matches!(self, Authenticated | Queued),
            ClientMessage::LeaveQueue => matches!(self, Queued),
            ClientMessage::JoinRoom { .. } => matches!(self, Authenticated | RoomPending),
            ClientMessage::StartBotGame { .. } => matches!(self, Authenticated),
            ClientMessage::SetBoard { .. } => matches!(self, Placement),
            ClientMessage::FireShot { .. } => matches!(self, Battle),
            ClientMessage::GetState => matches!(self, Placement | Battle | Finished),
            ClientMessage::Forfeit => matches!(self, Placement | Battle),
        }
    }
}

/// A private room: short code, optional attached game, 10-minute expiry.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: String,
    pub creator_id: String,
    pub game_id: Option<String>,
    pub full: bool,
    pub created_at: Instant,
}

impl Room {
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > ROOM_TTL
    }
}

/// Outcome of a single-critical-section attempt on a room's free slot.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomClaim {
    /// The caller took the slot; the room is full pending game creation.
    Claimed { creator_id: String },
    /// No room exists under this code, or it expired.
    Missing,
    /// The room already carries a game.
    HasGame { game_id: String, full: bool },
    /// The caller created the room and is still waiting for an opponent.
    Creator,
    /// Another joiner already holds the slot.
    Full,
}

type Sender = mpsc::UnboundedSender<ServerMessage>;

/// Process-wide mutable session state, constructed once at startup and
/// passed by reference to every handler.
///
/// The matchmaking queue is locked around the whole add-then-match sequence;
/// each game id owns a logical lock serializing all of its state-mutating
/// intents; bot strategies are mutated only under their game's lock.
pub struct SessionManager {
    queue: Mutex<MatchmakingQueue>,
    rooms: Mutex<HashMap<String, Room>>,
    strategies: Mutex<HashMap<String, BotStrategy>>,
    game_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    connections: Mutex<HashMap<String, Sender>>,
    members: Mutex<HashMap<String, Vec<String>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(MatchmakingQueue::new()),
            rooms: Mutex::new(HashMap::new()),
            strategies: Mutex::new(HashMap::new()),
            game_locks: Mutex::new(HashMap::new()),
            connections: Mutex::new(HashMap::new()),
            members: Mutex::new(HashMap::new()),
        }
    }

    /// Add a player to the queue and immediately attempt a pairing, as one
    /// atomic step. A duplicate add is a no-op before the match attempt.
    pub fn enqueue(&self, user_id: &str) -> Option<(String, String)> {
        let mut queue = self.queue.lock().expect("queue lock poisoned");
        queue.add(user_id);
        queue.try_match()
    }

    pub fn dequeue(&self, user_id: &str) {
        let mut queue = self.queue.lock().expect("queue lock poisoned");
        queue.remove(user_id);
    }

    pub fn queue_position(&self, user_id: &str) -> Option<usize> {
        let queue = self.queue.lock().expect("queue lock poisoned");
        queue.position(user_id)
    }

    /// Register the outbound channel of an authenticated connection.
    pub fn register_connection(&self, user_id: &str, sender: Sender) {
        let mut connections = self.connections.lock().expect("connections lock poisoned");
        connections.insert(user_id.to_string(), sender);
    }

    /// Drop a connection: future deliveries to the user simply stop.
    pub fn unregister_connection(&self, user_id: &str) {
        let mut connections = self.connections.lock().expect("connections lock poisoned");
        connections.remove(user_id);
    }

    /// Deliver a notification to one user, best effort.
    pub fn notify_user(&self, user_id: &str, msg: ServerMessage) {
        let connections = self.connections.lock().expect("connections lock poisoned");
        if let Some(sender) = connections.get(user_id) {
            let _ = sender.send(msg);
        }
    }

    /// Attach a user to a session's broadcast set.
    pub fn attach(&self, game_id: &str, user_id: &str) {
        let mut members = self.members.lock().expect("members lock poisoned");
        let entry = members.entry(game_id.to_string()).or_default();
        if !entry.iter().any(|m| m == user_id) {
            entry.push(user_id.to_string());
        }
    }

    /// Remove a user from a session's broadcast set without altering the
    /// session itself.
    pub fn detach(&self, game_id: &str, user_id: &str) {
        let mut members = self.members.lock().expect("members lock poisoned");
        if let Some(entry) = members.get_mut(game_id) {
            entry.retain(|m| m != user_id);
            if entry.is_empty() {
                members.remove(game_id);
            }
        }
    }

    /// Fan a notification out to every connection attached to a session.
    /// Callers invoke this only after the mutating step has committed.
    pub fn broadcast(&self, game_id: &str, msg: &ServerMessage) {
        let members = self.members.lock().expect("members lock poisoned");
        let connections = self.connections.lock().expect("connections lock poisoned");
        if let Some(users) = members.get(game_id) {
            for user in users {
                if let Some(sender) = connections.get(user) {
                    let _ = sender.send(msg.clone());
                }
            }
        }
    }

    /// The logical lock serializing all mutating intents for one game.
    pub fn game_lock(&self, game_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.game_locks.lock().expect("game locks poisoned");
        locks
            .entry(game_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Create a pending room with a fresh unique code.
    pub fn create_room<R: Rng + ?Sized>(&self, creator_id: &str, rng: &mut R) -> GameResult<Room> {
        let mut rooms = self.rooms.lock().expect("rooms lock poisoned");
        for _ in 0..10 {
            let code = generate_room_code(rng);
            if rooms.contains_key(&code) {
                continue;
            }
            let room = Room {
                code: code.clone(),
                creator_id: creator_id.to_string(),
                game_id: None,
                full: false,
                created_at: Instant::now(),
            };
            rooms.insert(code, room.clone());
            return Ok(room);
        }
        Err(GameError::internal("failed to generate unique room code"))
    }

    /// Inspect a room and, when its slot is free, take it — all in one
    /// critical section, so two concurrent joiners can never both observe
    /// a pending room. Expired rooms are deleted here.
    pub fn claim_room(&self, code: &str, joiner_id: &str) -> RoomClaim {
        let mut rooms = self.rooms.lock().expect("rooms lock poisoned");
        let Some(room) = rooms.get_mut(code) else {
            return RoomClaim::Missing;
        };
        if room.is_expired() {
            rooms.remove(code);
            return RoomClaim::Missing;
        }
        if let Some(game_id) = room.game_id.clone() {
            return RoomClaim::HasGame {
                game_id,
                full: room.full,
            };
        }
        if room.creator_id == joiner_id {
            return RoomClaim::Creator;
        }
        if room.full {
            return RoomClaim::Full;
        }
        room.full = true;
        RoomClaim::Claimed {
            creator_id: room.creator_id.clone(),
        }
    }

    /// Record the game a claimed room produced.
    pub fn set_room_game(&self, code: &str, game_id: &str) {
        let mut rooms = self.rooms.lock().expect("rooms lock poisoned");
        if let Some(room) = rooms.get_mut(code) {
            room.game_id = Some(game_id.to_string());
        }
    }

    /// Reopen a claimed slot after game creation failed.
    pub fn release_room_claim(&self, code: &str) {
        let mut rooms = self.rooms.lock().expect("rooms lock poisoned");
        if let Some(room) = rooms.get_mut(code) {
            if room.game_id.is_none() {
                room.full = false;
            }
        }
    }

    pub fn insert_strategy(&self, game_id: &str, strategy: BotStrategy) {
        let mut strategies = self.strategies.lock().expect("strategies lock poisoned");
        strategies.insert(game_id.to_string(), strategy);
    }

    /// Run a closure against a game's bot strategy. Callers hold the game's
    /// logical lock, so the short registry lock here never contends with
    /// another mutation of the same strategy.
    pub fn with_strategy<F, T>(&self, game_id: &str, f: F) -> Option<T>
    where
        F: FnOnce(&mut BotStrategy) -> T,
    {
        let mut strategies = self.strategies.lock().expect("strategies lock poisoned");
        strategies.get_mut(game_id).map(f)
    }

    /// Discard a finished session's strategy.
    pub fn remove_strategy(&self, game_id: &str) {
        let mut strategies = self.strategies.lock().expect("strategies lock poisoned");
        strategies.remove(game_id);
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
