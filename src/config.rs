//! Server-wide constants.

use tokio::time::Duration;

/// Default grid dimensions for the classic rule set.
pub const DEFAULT_BOARD_WIDTH: u8 = 10;
pub const DEFAULT_BOARD_HEIGHT: u8 = 10;

/// Length of a private room code.
pub const ROOM_CODE_LEN: usize = 4;

/// A pending room that nobody joined expires after this long.
pub const ROOM_TTL: Duration = Duration::from_secs(10 * 60);

/// Random-probe budget before the bot falls back to a deterministic scan of
/// unexplored cells.
pub const BOT_SEARCH_ATTEMPTS: usize = 100;

/// Placement attempts per generated ship before fleet generation fails.
pub const FLEET_PLACEMENT_ATTEMPTS: usize = 100;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
