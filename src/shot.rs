//! Shot resolution against a board: classification, application, clearance.

use serde::{Deserialize, Serialize};

use crate::board::{BoardState, Position};

/// Outcome of a single shot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotResult {
    Miss,
    Hit,
    Sink { ship_id: String, game_over: bool },
}

impl ShotResult {
    pub fn is_game_over(&self) -> bool {
        matches!(self, ShotResult::Sink { game_over: true, .. })
    }
}

/// Classify a shot without mutating the board. A ship under the coordinate
/// whose every cell would be covered by the augmented hit set yields `Sink`,
/// carrying the game-over flag when that sink clears the fleet.
pub fn resolve_shot(board: &BoardState, shot: Position) -> ShotResult {
    let Some(ship) = board.ship_at(shot) else {
        return ShotResult::Miss;
    };

    let sunk = ship
        .positions
        .iter()
        .all(|pos| *pos == shot || board.is_hit(*pos));
    if !sunk {
        return ShotResult::Hit;
    }

    // Game over when every other ship is already sunk.
    let game_over = board
        .ships
        .iter()
        .filter(|s| s.id != ship.id)
        .all(|s| board.sunken_ships.contains(&s.id));
    ShotResult::Sink {
        ship_id: ship.id.clone(),
        game_over,
    }
}

/// Apply a shot, returning the updated board. Firing at an already-resolved
/// coordinate returns the board unchanged; duplicate-shot rejection is the
/// session protocol's responsibility.
pub fn apply_shot(board: &BoardState, shot: Position) -> BoardState {
    let mut updated = board.clone();
    if updated.ship_at(shot).is_some() {
        updated.add_hit(shot);
    } else {
        updated.add_miss(shot);
    }
    updated
}

/// `true` iff the board has at least one ship and every ship is sunk.
pub fn is_game_over(board: &BoardState) -> bool {
    board.is_cleared()
}
