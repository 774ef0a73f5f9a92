mod auth;
mod board;
mod bot;
mod config;
mod error;
mod logging;
mod matchmaking;
pub mod protocol;
mod realtime;
mod rules;
mod service;
mod session;
mod shot;
mod store;
pub mod transport;
mod turns;

pub use auth::{Identity, TokenRegistry, UserId};
pub use board::{BoardState, Position, Ship};
pub use bot::{generate_fleet, BotDifficulty, BotStrategy};
pub use config::*;
pub use error::{GameError, GameResult};
pub use logging::{init_logging, init_logging_at};
pub use matchmaking::{generate_room_code, is_valid_room_code, MatchmakingQueue};
pub use protocol::{ClientMessage, GameStateView, OpponentInfo, PlayerView, ServerMessage};
pub use realtime::Connection;
pub use rules::{validate_fleet, validate_placement, RuleSet, ShipConfig};
pub use service::{
    BotTurn, FireOutcome, GameService, QueueOutcome, RoomOutcome, SetBoardOutcome,
};
pub use session::{ConnectionPhase, Room, RoomClaim, SessionManager};
pub use shot::{apply_shot, is_game_over, resolve_shot, ShotResult};
pub use store::{BoardRecord, GameRecord, GameStatus, GameStore, MemoryStore, ShotRecord};
pub use turns::{
    can_player_move, is_current_turn, next_turn_player, switch_turn_after_miss, TurnView,
};
