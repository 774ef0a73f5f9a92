//! Persistence collaborator: game, board and shot records.
//!
//! The core only ever talks to the [`GameStore`] trait; the in-memory
//! implementation below backs the server binary and the test suite. A
//! relational store is an external concern and plugs in behind the same
//! trait.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::bot::BotDifficulty;
use crate::rules::RuleSet;
use crate::shot::ShotResult;

/// Lifecycle status of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Lobby,
    InProgress,
    Finished,
    Abandoned,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::Finished | GameStatus::Abandoned)
    }
}

/// Persistent game record. The second participant is absent pre-match; for
/// bot games it holds the synthetic bot identity.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub id: String,
    pub status: GameStatus,
    pub p1_id: String,
    pub p2_id: Option<String>,
    pub turn_user_id: Option<String>,
    pub winner_id: Option<String>,
    pub width: u8,
    pub height: u8,
    pub rule_set: String,
    pub is_vs_bot: bool,
    pub bot_difficulty: Option<BotDifficulty>,
}

/// One participant's board, keyed by (game, owner). `data_json` is the flat
/// board encoding; `ready` flips once a valid fleet has been submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardRecord {
    pub game_id: String,
    pub owner_id: String,
    pub data_json: String,
    pub ready: bool,
}

/// Append-only shot log entry, keyed by (game, x, y) for duplicate
/// detection.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotRecord {
    pub game_id: String,
    pub shooter_id: String,
    pub x: u8,
    pub y: u8,
    pub result: ShotResult,
}

#[async_trait::async_trait]
pub trait GameStore: Send + Sync {
    async fn find_rule_set(&self, name: &str) -> anyhow::Result<Option<RuleSet>>;

    async fn create_game(&self, game: GameRecord) -> anyhow::Result<()>;
    async fn find_game(&self, id: &str) -> anyhow::Result<Option<GameRecord>>;
    /// Replace the stored record for `game.id` (status, turn, winner).
    async fn update_game(&self, game: &GameRecord) -> anyhow::Result<()>;

    async fn upsert_board(&self, board: BoardRecord) -> anyhow::Result<()>;
    async fn find_board(&self, game_id: &str, owner_id: &str)
        -> anyhow::Result<Option<BoardRecord>>;
    async fn boards_for_game(&self, game_id: &str) -> anyhow::Result<Vec<BoardRecord>>;

    async fn insert_shot(&self, shot: ShotRecord) -> anyhow::Result<()>;
    async fn find_shot(&self, game_id: &str, x: u8, y: u8) -> anyhow::Result<Option<ShotRecord>>;
    async fn shots_for_game(&self, game_id: &str) -> anyhow::Result<Vec<ShotRecord>>;
}

#[derive(Default)]
struct MemoryStoreInner {
    rule_sets: HashMap<String, RuleSet>,
    games: HashMap<String, GameRecord>,
    boards: HashMap<(String, String), BoardRecord>,
    shots: Vec<ShotRecord>,
}

/// Process-local store. Seeds the classic rule set on construction.
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut inner = MemoryStoreInner::default();
        let classic = RuleSet::classic();
        inner.rule_sets.insert(classic.name.clone(), classic);
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Register an additional rule set by name.
    pub fn add_rule_set(&self, rules: RuleSet) {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.rule_sets.insert(rules.name.clone(), rules);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl GameStore for MemoryStore {
    async fn find_rule_set(&self, name: &str) -> anyhow::Result<Option<RuleSet>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.rule_sets.get(name).cloned())
    }

    async fn create_game(&self, game: GameRecord) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if inner.games.contains_key(&game.id) {
            anyhow::bail!("game {} already exists", game.id);
        }
        inner.games.insert(game.id.clone(), game);
        Ok(())
    }

    async fn find_game(&self, id: &str) -> anyhow::Result<Option<GameRecord>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.games.get(id).cloned())
    }

    async fn update_game(&self, game: &GameRecord) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if !inner.games.contains_key(&game.id) {
            anyhow::bail!("game {} not found", game.id);
        }
        inner.games.insert(game.id.clone(), game.clone());
        Ok(())
    }

    async fn upsert_board(&self, board: BoardRecord) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner
            .boards
            .insert((board.game_id.clone(), board.owner_id.clone()), board);
        Ok(())
    }

    async fn find_board(
        &self,
        game_id: &str,
        owner_id: &str,
    ) -> anyhow::Result<Option<BoardRecord>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .boards
            .get(&(game_id.to_string(), owner_id.to_string()))
            .cloned())
    }

    async fn boards_for_game(&self, game_id: &str) -> anyhow::Result<Vec<BoardRecord>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .boards
            .values()
            .filter(|b| b.game_id == game_id)
            .cloned()
            .collect())
    }

    async fn insert_shot(&self, shot: ShotRecord) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if inner
            .shots
            .iter()
            .any(|s| s.game_id == shot.game_id && s.x == shot.x && s.y == shot.y)
        {
            anyhow::bail!("duplicate shot at ({}, {})", shot.x, shot.y);
        }
        inner.shots.push(shot);
        Ok(())
    }

    async fn find_shot(&self, game_id: &str, x: u8, y: u8) -> anyhow::Result<Option<ShotRecord>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .shots
            .iter()
            .find(|s| s.game_id == game_id && s.x == x && s.y == y)
            .cloned())
    }

    async fn shots_for_game(&self, game_id: &str) -> anyhow::Result<Vec<ShotRecord>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .shots
            .iter()
            .filter(|s| s.game_id == game_id)
            .cloned()
            .collect())
    }
}
