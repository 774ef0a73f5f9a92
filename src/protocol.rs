//! Wire protocol: tagged intents from clients and notifications back.

use serde::{Deserialize, Serialize};

use crate::board::BoardState;
use crate::shot::ShotResult;
use crate::store::GameStatus;

/// Inbound intents. A connection must send `Init` before anything else is
/// accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Identity assertion carrying an opaque credential blob.
    Init { credential: String },
    JoinQueue,
    LeaveQueue,
    /// Join or create a private room by short code.
    JoinRoom { code: String },
    /// Start a session against the computer opponent.
    StartBotGame { difficulty: String },
    /// Submit a fleet for the placement phase.
    SetBoard { board: BoardState },
    FireShot { x: u8, y: u8 },
    GetState,
    Forfeit,
}

/// Public identity of the paired opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentInfo {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: String,
    pub ready: bool,
}

/// Snapshot of a game for `GetState` and the request/response surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateView {
    pub id: String,
    pub status: GameStatus,
    pub turn_user_id: Option<String>,
    pub winner_id: Option<String>,
    pub p1: PlayerView,
    pub p2: Option<PlayerView>,
}

/// Outbound notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Authentication succeeded.
    Ready { user_id: String },
    /// Structured rejection of a single intent.
    Error { code: String, message: String },
    QueueWaiting,
    RoomCreated { code: String },
    RoomWaiting,
    GameJoined { game_id: String },
    GameStarted {
        game_id: String,
        opponent: OpponentInfo,
    },
    BoardSet,
    AllReady,
    /// A committed shot, broadcast to every connection in the session.
    ShotFired {
        x: u8,
        y: u8,
        by: String,
        result: ShotResult,
    },
    GameState(GameStateView),
    GameForfeited { forfeiter_id: String },
}

impl ServerMessage {
    pub fn error(err: &crate::error::GameError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
