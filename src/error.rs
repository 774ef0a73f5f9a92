//! Error taxonomy reported back to clients as structured notifications.

use thiserror::Error;

/// Everything a rejected intent can report. All variants are recoverable at
/// the protocol boundary except an invalid credential, which closes the
/// connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("not authenticated")]
    MissingAuth,
    #[error("invalid or expired credential")]
    InvalidAuth,
    #[error("game not found")]
    GameNotFound,
    #[error("not attached to a game")]
    NotInGame,
    #[error("not your turn")]
    NotYourTurn,
    #[error("coordinates out of bounds")]
    InvalidCoordinates,
    #[error("cell was already shot")]
    CellAlreadyShot,
    #[error("invalid fleet placement")]
    InvalidPlacement,
    #[error("room is full")]
    RoomFull,
    #[error("room already has a game")]
    RoomHasGame,
    #[error("room not found or expired")]
    RoomNotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    /// Stable wire code for the client.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::MissingAuth => "ERR_MISSING_AUTH",
            GameError::InvalidAuth => "ERR_INVALID_AUTH",
            GameError::GameNotFound => "ERR_GAME_NOT_FOUND",
            GameError::NotInGame => "ERR_NOT_IN_GAME",
            GameError::NotYourTurn => "ERR_NOT_YOUR_TURN",
            GameError::InvalidCoordinates => "ERR_INVALID_COORDINATES",
            GameError::CellAlreadyShot => "ERR_CELL_ALREADY_SHOT",
            GameError::InvalidPlacement => "ERR_INVALID_PLACEMENT",
            GameError::RoomFull => "ERR_ROOM_FULL",
            GameError::RoomHasGame => "ERR_ROOM_HAS_GAME",
            GameError::RoomNotFound => "ERR_ROOM_NOT_FOUND",
            GameError::Internal(_) => "ERR_INTERNAL",
        }
    }

    /// Fatal errors tear down the connection after being reported.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::InvalidAuth)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        GameError::Internal(msg.into())
    }
}

impl From<anyhow::Error> for GameError {
    fn from(err: anyhow::Error) -> Self {
        GameError::Internal(err.to_string())
    }
}

pub type GameResult<T> = Result<T, GameError>;
