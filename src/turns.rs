//! Turn arbitration over a minimal view of a game.

use crate::store::GameStatus;

/// The slice of game state the arbiter needs.
#[derive(Debug, Clone)]
pub struct TurnView {
    pub status: GameStatus,
    pub p1: String,
    pub p2: Option<String>,
    pub turn_holder: Option<String>,
}

/// The participant who moves next, or `None` while the game has no second
/// participant. With no turn holder set, the first participant moves first;
/// otherwise the turn alternates to the other participant.
pub fn next_turn_player(game: &TurnView) -> Option<&str> {
    let p2 = game.p2.as_deref()?;
    match game.turn_holder.as_deref() {
        None => Some(game.p1.as_str()),
        Some(holder) if holder == game.p1 => Some(p2),
        Some(_) => Some(game.p1.as_str()),
    }
}

pub fn is_current_turn(game: &TurnView, user_id: &str) -> bool {
    if game.status != GameStatus::InProgress {
        return false;
    }
    game.turn_holder.as_deref() == Some(user_id)
}

/// A player may act iff the game is in progress, the second participant is
/// present and the stored turn holder is the acting player.
pub fn can_player_move(game: &TurnView, user_id: &str) -> bool {
    if game.status != GameStatus::InProgress || game.p2.is_none() {
        return false;
    }
    is_current_turn(game, user_id)
}

/// The turn rotates only after a miss; a hit or a non-terminal sink leaves
/// the shooter in place.
pub fn switch_turn_after_miss(game: &TurnView) -> Option<&str> {
    next_turn_player(game)
}
