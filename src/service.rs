//! Game orchestration shared by the realtime handler and the
//! request/response surface, so both produce identical results.
//!
//! Every state-mutating operation takes the owning game's logical lock for
//! the whole read-modify-write cycle and broadcasts only after the store
//! write has committed.

use std::str::FromStr;
use std::sync::Arc;

use log::{debug, info};
use rand::distr::Alphanumeric;
use rand::Rng;

use crate::board::{BoardState, Position};
use crate::bot::{generate_fleet, BotDifficulty, BotStrategy};
use crate::error::{GameError, GameResult};
use crate::matchmaking::is_valid_room_code;
use crate::protocol::{GameStateView, OpponentInfo, PlayerView, ServerMessage};
use crate::rules::validate_fleet;
use crate::session::{RoomClaim, SessionManager};
use crate::shot::{apply_shot, resolve_shot, ShotResult};
use crate::store::{BoardRecord, GameRecord, GameStatus, GameStore, ShotRecord};
use crate::turns::{can_player_move, switch_turn_after_miss, TurnView};

/// Result of a queue-join intent.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueOutcome {
    Waiting { position: usize },
    Matched { game_id: String },
}

/// Result of a room-join intent.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomOutcome {
    Created { code: String },
    Waiting,
    Joined { game_id: String, status: GameStatus },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetBoardOutcome {
    pub all_ready: bool,
}

/// Result of an accepted shot.
#[derive(Debug, Clone, PartialEq)]
pub struct FireOutcome {
    pub result: ShotResult,
    pub next_turn: Option<String>,
    pub vs_bot: bool,
    pub bot_id: Option<String>,
}

/// Result of one bot step.
#[derive(Debug, Clone, PartialEq)]
pub struct BotTurn {
    pub x: u8,
    pub y: u8,
    pub result: ShotResult,
    pub next_turn: Option<String>,
}

pub struct GameService {
    store: Arc<dyn GameStore>,
    sessions: Arc<SessionManager>,
}

impl GameService {
    pub fn new(store: Arc<dyn GameStore>, sessions: Arc<SessionManager>) -> Self {
        Self { store, sessions }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Join the matchmaking queue. A successful pairing creates the game,
    /// attaches both participants and notifies each with the opponent's
    /// public identity.
    pub async fn join_queue(&self, user_id: &str) -> GameResult<QueueOutcome> {
        let Some((p1, p2)) = self.sessions.enqueue(user_id) else {
            let position = self.sessions.queue_position(user_id).unwrap_or(0);
            return Ok(QueueOutcome::Waiting { position });
        };

        let game_id = self.create_pvp_game(&p1, &p2).await?;
        info!("matched {} vs {} into game {}", p1, p2, game_id);

        self.sessions.notify_user(
            &p1,
            ServerMessage::GameStarted {
                game_id: game_id.clone(),
                opponent: OpponentInfo {
                    id: p2.clone(),
                    display_name: None,
                },
            },
        );
        self.sessions.notify_user(
            &p2,
            ServerMessage::GameStarted {
                game_id: game_id.clone(),
                opponent: OpponentInfo {
                    id: p1.clone(),
                    display_name: None,
                },
            },
        );

        Ok(QueueOutcome::Matched { game_id })
    }

    pub fn leave_queue(&self, user_id: &str) {
        self.sessions.dequeue(user_id);
    }

    /// Join or create a private room by short code. An unknown or expired
    /// code creates a fresh pending room; a second distinct player joining a
    /// pending room starts the game; a room whose game the caller already
    /// belongs to re-attaches them.
    pub async fn join_room(&self, user_id: &str, code: &str) -> GameResult<RoomOutcome> {
        let code = code.trim().to_ascii_uppercase();
        if !is_valid_room_code(&code) {
            return Err(GameError::RoomNotFound);
        }

        // The slot is taken (or refused) in one critical section, so two
        // concurrent joiners can never both start a game from one room.
        let creator = match self.sessions.claim_room(&code, user_id) {
            RoomClaim::Missing => {
                let room = self.sessions.create_room(user_id, &mut rand::rng())?;
                debug!("user {} created room {}", user_id, room.code);
                return Ok(RoomOutcome::Created { code: room.code });
            }
            RoomClaim::HasGame { game_id, full } => {
                let game = self
                    .store
                    .find_game(&game_id)
                    .await?
                    .ok_or(GameError::GameNotFound)?;
                let participant =
                    game.p1_id == user_id || game.p2_id.as_deref() == Some(user_id);
                if !participant {
                    return if full {
                        Err(GameError::RoomFull)
                    } else {
                        Err(GameError::RoomHasGame)
                    };
                }
                self.sessions.attach(&game_id, user_id);
                return Ok(RoomOutcome::Joined {
                    game_id,
                    status: game.status,
                });
            }
            RoomClaim::Creator => return Ok(RoomOutcome::Waiting),
            RoomClaim::Full => return Err(GameError::RoomFull),
            RoomClaim::Claimed { creator_id } => creator_id,
        };

        // Second player holds the slot: the room's game starts now.
        let game_id = match self.create_pvp_game(&creator, user_id).await {
            Ok(game_id) => game_id,
            Err(err) => {
                self.sessions.release_room_claim(&code);
                return Err(err);
            }
        };
        self.sessions.set_room_game(&code, &game_id);
        info!("room {} started game {}", code, game_id);

        self.sessions.notify_user(
            &creator,
            ServerMessage::GameStarted {
                game_id: game_id.clone(),
                opponent: OpponentInfo {
                    id: user_id.to_string(),
                    display_name: None,
                },
            },
        );

        Ok(RoomOutcome::Joined {
            game_id,
            status: GameStatus::Lobby,
        })
    }

    /// Validate and persist a participant's fleet. Once both boards are
    /// ready the game moves to battle and everyone is notified.
    pub async fn set_board(
        &self,
        user_id: &str,
        game_id: &str,
        board: &BoardState,
    ) -> GameResult<SetBoardOutcome> {
        let lock = self.sessions.game_lock(game_id);
        let _guard = lock.lock().await;

        let mut game = self
            .store
            .find_game(game_id)
            .await?
            .ok_or(GameError::GameNotFound)?;
        if game.p1_id != user_id && game.p2_id.as_deref() != Some(user_id) {
            return Err(GameError::NotInGame);
        }
        if game.status != GameStatus::Lobby {
            return Err(GameError::InvalidPlacement);
        }

        let rules = self
            .store
            .find_rule_set(&game.rule_set)
            .await?
            .ok_or_else(|| GameError::internal("rule set not found"))?;

        // A submitted board is a fresh fleet: correct dimensions, no shot
        // history smuggled in.
        if board.width != game.width
            || board.height != game.height
            || !board.hits.is_empty()
            || !board.misses.is_empty()
            || !board.sunken_ships.is_empty()
        {
            return Err(GameError::InvalidPlacement);
        }
        if !validate_fleet(&board.ships, &rules) {
            return Err(GameError::InvalidPlacement);
        }

        self.store
            .upsert_board(BoardRecord {
                game_id: game_id.to_string(),
                owner_id: user_id.to_string(),
                data_json: board.to_json()?,
                ready: true,
            })
            .await?;

        let boards = self.store.boards_for_game(game_id).await?;
        let all_ready = boards.len() == 2 && boards.iter().all(|b| b.ready);
        if all_ready {
            game.status = GameStatus::InProgress;
            if game.turn_user_id.is_none() {
                game.turn_user_id = Some(game.p1_id.clone());
            }
            self.store.update_game(&game).await?;
            info!("game {} entered battle", game_id);
            self.sessions.broadcast(game_id, &ServerMessage::AllReady);
        }

        Ok(SetBoardOutcome { all_ready })
    }

    /// Resolve a shot from the current turn holder against the opponent's
    /// board: turn ownership, bounds and the per-session duplicate log are
    /// enforced before anything mutates.
    pub async fn fire_shot(
        &self,
        user_id: &str,
        game_id: &str,
        x: u8,
        y: u8,
    ) -> GameResult<FireOutcome> {
        let lock = self.sessions.game_lock(game_id);
        let _guard = lock.lock().await;

        let mut game = self
            .store
            .find_game(game_id)
            .await?
            .ok_or(GameError::GameNotFound)?;
        let view = turn_view(&game);
        if !can_player_move(&view, user_id) {
            return Err(GameError::NotYourTurn);
        }
        if x >= game.width || y >= game.height {
            return Err(GameError::InvalidCoordinates);
        }
        if self.store.find_shot(game_id, x, y).await?.is_some() {
            return Err(GameError::CellAlreadyShot);
        }

        let opponent_id = if game.p1_id == user_id {
            game.p2_id.clone().ok_or(GameError::NotYourTurn)?
        } else {
            game.p1_id.clone()
        };
        let record = self
            .store
            .find_board(game_id, &opponent_id)
            .await?
            .ok_or_else(|| GameError::internal("opponent board not set"))?;
        let board = BoardState::from_json(&record.data_json)?;

        let pos = Position::new(x, y);
        let result = resolve_shot(&board, pos);

        self.store
            .insert_shot(ShotRecord {
                game_id: game_id.to_string(),
                shooter_id: user_id.to_string(),
                x,
                y,
                result: result.clone(),
            })
            .await?;

        let updated = apply_shot(&board, pos);
        self.store
            .upsert_board(BoardRecord {
                game_id: game_id.to_string(),
                owner_id: opponent_id.clone(),
                data_json: updated.to_json()?,
                ready: record.ready,
            })
            .await?;

        match &result {
            ShotResult::Miss => {
                game.turn_user_id = switch_turn_after_miss(&view).map(String::from);
                self.store.update_game(&game).await?;
            }
            ShotResult::Sink {
                game_over: true, ..
            } => {
                game.status = GameStatus::Finished;
                game.winner_id = Some(user_id.to_string());
                self.store.update_game(&game).await?;
                self.sessions.remove_strategy(game_id);
                info!("game {} won by {}", game_id, user_id);
            }
            // A hit or a non-terminal sink retains the turn.
            _ => {}
        }

        self.sessions.broadcast(
            game_id,
            &ServerMessage::ShotFired {
                x,
                y,
                by: user_id.to_string(),
                result: result.clone(),
            },
        );

        Ok(FireOutcome {
            result,
            next_turn: if game.status.is_terminal() {
                None
            } else {
                game.turn_user_id.clone()
            },
            vs_bot: game.is_vs_bot,
            bot_id: if game.is_vs_bot { game.p2_id.clone() } else { None },
        })
    }

    /// Immediately finish the session with the opponent declared winner.
    /// Forfeiting an already-finished game is a no-op returning the
    /// recorded winner.
    pub async fn forfeit(&self, user_id: &str, game_id: &str) -> GameResult<String> {
        let lock = self.sessions.game_lock(game_id);
        let _guard = lock.lock().await;

        let mut game = self
            .store
            .find_game(game_id)
            .await?
            .ok_or(GameError::GameNotFound)?;
        if game.p1_id != user_id && game.p2_id.as_deref() != Some(user_id) {
            return Err(GameError::NotInGame);
        }
        let opponent = if game.p1_id == user_id {
            game.p2_id.clone().ok_or(GameError::NotInGame)?
        } else {
            game.p1_id.clone()
        };

        if game.status.is_terminal() {
            return Ok(game.winner_id.clone().unwrap_or(opponent));
        }

        game.status = GameStatus::Finished;
        game.winner_id = Some(opponent.clone());
        self.store.update_game(&game).await?;
        self.sessions.remove_strategy(game_id);
        info!("game {} forfeited by {}", game_id, user_id);

        self.sessions.broadcast(
            game_id,
            &ServerMessage::GameForfeited {
                forfeiter_id: user_id.to_string(),
            },
        );

        Ok(opponent)
    }

    /// Game snapshot for a participant.
    pub async fn game_state(&self, user_id: &str, game_id: &str) -> GameResult<GameStateView> {
        let game = self
            .store
            .find_game(game_id)
            .await?
            .ok_or(GameError::GameNotFound)?;
        if game.p1_id != user_id && game.p2_id.as_deref() != Some(user_id) {
            return Err(GameError::NotInGame);
        }

        let boards = self.store.boards_for_game(game_id).await?;
        let ready = |owner: &str| boards.iter().any(|b| b.owner_id == owner && b.ready);

        Ok(GameStateView {
            id: game.id.clone(),
            status: game.status,
            turn_user_id: game.turn_user_id.clone(),
            winner_id: game.winner_id.clone(),
            p1: PlayerView {
                id: game.p1_id.clone(),
                ready: ready(&game.p1_id),
            },
            p2: game.p2_id.as_ref().map(|p2| PlayerView {
                id: p2.clone(),
                ready: ready(p2),
            }),
        })
    }

    /// Create a session against the computer opponent: the human lands in
    /// placement, the bot board is generated and ready, and a fresh
    /// strategy is registered under the game id.
    pub async fn create_bot_game(
        &self,
        user_id: &str,
        difficulty: &str,
    ) -> GameResult<String> {
        let difficulty = BotDifficulty::from_str(difficulty)?;
        let rules = self
            .store
            .find_rule_set("classic")
            .await?
            .ok_or_else(|| GameError::internal("rule set not found"))?;

        let game_id = new_game_id();
        let bot_id = format!("bot-{}", game_id);

        self.store
            .create_game(GameRecord {
                id: game_id.clone(),
                status: GameStatus::Lobby,
                p1_id: user_id.to_string(),
                p2_id: Some(bot_id.clone()),
                turn_user_id: Some(user_id.to_string()),
                winner_id: None,
                width: rules.width,
                height: rules.height,
                rule_set: rules.name.clone(),
                is_vs_bot: true,
                bot_difficulty: Some(difficulty),
            })
            .await?;

        let mut bot_board = BoardState::new(rules.width, rules.height);
        bot_board.ships = generate_fleet(&rules, &mut rand::rng())?;
        self.store
            .upsert_board(BoardRecord {
                game_id: game_id.clone(),
                owner_id: bot_id,
                data_json: bot_board.to_json()?,
                ready: true,
            })
            .await?;

        self.sessions.insert_strategy(
            &game_id,
            BotStrategy::new(difficulty, rules.width, rules.height),
        );
        self.sessions.attach(&game_id, user_id);
        info!("created bot game {} for {}", game_id, user_id);

        Ok(game_id)
    }

    /// Step the computer opponent once: draw a coordinate from its
    /// strategy, resolve against the human's board, feed the result back
    /// and finish the session if the fleet is cleared.
    pub async fn bot_make_turn(&self, game_id: &str) -> GameResult<BotTurn> {
        let lock = self.sessions.game_lock(game_id);
        let _guard = lock.lock().await;

        let mut game = self
            .store
            .find_game(game_id)
            .await?
            .ok_or(GameError::GameNotFound)?;
        if !game.is_vs_bot {
            return Err(GameError::internal("not a bot game"));
        }
        let bot_id = game
            .p2_id
            .clone()
            .ok_or_else(|| GameError::internal("bot identity missing"))?;
        let view = turn_view(&game);
        if !can_player_move(&view, &bot_id) {
            return Err(GameError::NotYourTurn);
        }

        let record = self
            .store
            .find_board(game_id, &game.p1_id)
            .await?
            .ok_or_else(|| GameError::internal("player board not set"))?;
        let board = BoardState::from_json(&record.data_json)?;

        // The duplicate-shot log is per session, not per shooter, so the
        // strategy must also skip cells the human already fired upon.
        let mut shot = None;
        for _ in 0..(game.width as usize * game.height as usize) {
            let candidate = self
                .sessions
                .with_strategy(game_id, |s| s.next_shot(&mut rand::rng()))
                .ok_or_else(|| GameError::internal("bot strategy not found"))?;
            if self
                .store
                .find_shot(game_id, candidate.x, candidate.y)
                .await?
                .is_none()
            {
                shot = Some(candidate);
                break;
            }
            self.sessions
                .with_strategy(game_id, |s| s.mark_fired(candidate));
        }
        let shot = shot.ok_or_else(|| GameError::internal("no unexplored cells remain"))?;

        let result = resolve_shot(&board, shot);

        self.store
            .insert_shot(ShotRecord {
                game_id: game_id.to_string(),
                shooter_id: bot_id.clone(),
                x: shot.x,
                y: shot.y,
                result: result.clone(),
            })
            .await?;

        let updated = apply_shot(&board, shot);
        self.store
            .upsert_board(BoardRecord {
                game_id: game_id.to_string(),
                owner_id: game.p1_id.clone(),
                data_json: updated.to_json()?,
                ready: record.ready,
            })
            .await?;

        self.sessions
            .with_strategy(game_id, |s| s.process_result(shot, &result));

        match &result {
            ShotResult::Miss => {
                game.turn_user_id = Some(game.p1_id.clone());
                self.store.update_game(&game).await?;
            }
            ShotResult::Sink {
                game_over: true, ..
            } => {
                game.status = GameStatus::Finished;
                game.winner_id = Some(bot_id.clone());
                self.store.update_game(&game).await?;
                self.sessions.remove_strategy(game_id);
                info!("game {} won by the bot", game_id);
            }
            _ => {}
        }

        self.sessions.broadcast(
            game_id,
            &ServerMessage::ShotFired {
                x: shot.x,
                y: shot.y,
                by: bot_id,
                result: result.clone(),
            },
        );

        Ok(BotTurn {
            x: shot.x,
            y: shot.y,
            result,
            next_turn: if game.status.is_terminal() {
                None
            } else {
                game.turn_user_id.clone()
            },
        })
    }

    async fn create_pvp_game(&self, p1: &str, p2: &str) -> GameResult<String> {
        let rules = self
            .store
            .find_rule_set("classic")
            .await?
            .ok_or_else(|| GameError::internal("rule set not found"))?;
        let game_id = new_game_id();
        self.store
            .create_game(GameRecord {
                id: game_id.clone(),
                status: GameStatus::Lobby,
                p1_id: p1.to_string(),
                p2_id: Some(p2.to_string()),
                turn_user_id: Some(p1.to_string()),
                winner_id: None,
                width: rules.width,
                height: rules.height,
                rule_set: rules.name.clone(),
                is_vs_bot: false,
                bot_difficulty: None,
            })
            .await?;
        self.sessions.attach(&game_id, p1);
        self.sessions.attach(&game_id, p2);
        Ok(game_id)
    }
}

fn turn_view(game: &GameRecord) -> TurnView {
    TurnView {
        status: game.status,
        p1: game.p1_id.clone(),
        p2: game.p2_id.clone(),
        turn_holder: game.turn_user_id.clone(),
    }
}

fn new_game_id() -> String {
    let rng = rand::rng();
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("game-{}", suffix.to_ascii_lowercase())
}
