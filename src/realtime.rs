//! Per-connection realtime handler.
//!
//! Each accepted transport gets one task running [`Connection::run`]: a
//! select loop over inbound intents and the user's notification channel.
//! Every intent is guarded by the connection's phase before it reaches the
//! service; a rejected intent produces exactly one error notification.

use std::sync::Arc;

use anyhow::Result;
use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::auth::Identity;
use crate::error::GameError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::service::{GameService, QueueOutcome, RoomOutcome};
use crate::session::ConnectionPhase;
use crate::shot::ShotResult;
use crate::store::GameStatus;
use crate::transport::Transport;

pub struct Connection<T: Transport> {
    transport: T,
    service: Arc<GameService>,
    identity: Arc<dyn Identity>,
    phase: ConnectionPhase,
    user_id: Option<String>,
    game_id: Option<String>,
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T, service: Arc<GameService>, identity: Arc<dyn Identity>) -> Self {
        Self {
            transport,
            service,
            identity,
            phase: ConnectionPhase::Unauthenticated,
            user_id: None,
            game_id: None,
        }
    }

    /// Drive the connection until the peer disconnects or a fatal error
    /// closes it. Notifications queued for this user are forwarded between
    /// inbound intents.
    pub async fn run(mut self) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

        let result = loop {
            tokio::select! {
                incoming = self.transport.recv() => {
                    match incoming {
                        Ok(msg) => match self.handle_message(msg, &tx).await {
                            Ok(true) => {}
                            Ok(false) => break Ok(()),
                            Err(err) => break Err(err),
                        },
                        Err(err) => {
                            debug!("connection closed: {}", err);
                            break Ok(());
                        }
                    }
                }
                Some(notice) = rx.recv() => {
                    self.observe(&notice);
                    if let Err(err) = self.transport.send(&notice).await {
                        break Err(err);
                    }
                }
            }
        };

        self.cleanup();
        result
    }

    /// Handle one inbound intent. Returns `false` when the connection must
    /// close.
    async fn handle_message(
        &mut self,
        msg: ClientMessage,
        tx: &mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<bool> {
        if !self.phase.permits(&msg) {
            let err = self.phase_error(&msg);
            self.transport.send(&ServerMessage::error(&err)).await?;
            return Ok(!err.is_fatal());
        }

        let outcome = match msg {
            ClientMessage::Init { credential } => return self.handle_init(&credential, tx).await,
            ClientMessage::JoinQueue => self.handle_join_queue().await,
            ClientMessage::LeaveQueue => {
                self.service.leave_queue(self.user());
                self.phase = ConnectionPhase::Authenticated;
                Ok(None)
            }
            ClientMessage::JoinRoom { code } => self.handle_join_room(&code).await,
            ClientMessage::StartBotGame { difficulty } => {
                self.handle_start_bot_game(&difficulty).await
            }
            ClientMessage::SetBoard { board } => {
                let game_id = self.game();
                self.service
                    .set_board(self.user(), &game_id, &board)
                    .await
                    .map(|_| Some(ServerMessage::BoardSet))
            }
            ClientMessage::FireShot { x, y } => self.handle_fire_shot(x, y).await,
            ClientMessage::GetState => {
                let game_id = self.game();
                self.service
                    .game_state(self.user(), &game_id)
                    .await
                    .map(|view| Some(ServerMessage::GameState(view)))
            }
            ClientMessage::Forfeit => {
                let game_id = self.game();
                match self.service.forfeit(self.user(), &game_id).await {
                    Ok(_) => {
                        self.phase = ConnectionPhase::Finished;
                        Ok(None)
                    }
                    Err(err) => Err(err),
                }
            }
        };

        match outcome {
            Ok(Some(reply)) => {
                self.transport.send(&reply).await?;
                Ok(true)
            }
            Ok(None) => Ok(true),
            Err(err) => {
                self.transport.send(&ServerMessage::error(&err)).await?;
                Ok(!err.is_fatal())
            }
        }
    }

    async fn handle_init(
        &mut self,
        credential: &str,
        tx: &mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<bool> {
        if credential.is_empty() {
            let err = GameError::MissingAuth;
            self.transport.send(&ServerMessage::error(&err)).await?;
            return Ok(true);
        }
        match self.identity.authenticate(credential).await? {
            Some(user_id) => {
                self.service
                    .sessions()
                    .register_connection(&user_id, tx.clone());
                info!("connection authenticated as {}", user_id);
                self.user_id = Some(user_id.clone());
                self.phase = ConnectionPhase::Authenticated;
                self.transport
                    .send(&ServerMessage::Ready { user_id })
                    .await?;
                Ok(true)
            }
            None => {
                let err = GameError::InvalidAuth;
                self.transport.send(&ServerMessage::error(&err)).await?;
                Ok(false)
            }
        }
    }

    async fn handle_join_queue(&mut self) -> Result<Option<ServerMessage>, GameError> {
        match self.service.join_queue(self.user()).await? {
            QueueOutcome::Waiting { .. } => {
                self.phase = ConnectionPhase::Queued;
                Ok(Some(ServerMessage::QueueWaiting))
            }
            QueueOutcome::Matched { game_id } => {
                // The pairing notification itself arrives on the channel.
                self.game_id = Some(game_id);
                self.phase = ConnectionPhase::Placement;
                Ok(None)
            }
        }
    }

    async fn handle_join_room(&mut self, code: &str) -> Result<Option<ServerMessage>, GameError> {
        match self.service.join_room(self.user(), code).await? {
            RoomOutcome::Created { code } => {
                self.phase = ConnectionPhase::RoomPending;
                Ok(Some(ServerMessage::RoomCreated { code }))
            }
            RoomOutcome::Waiting => {
                self.phase = ConnectionPhase::RoomPending;
                Ok(Some(ServerMessage::RoomWaiting))
            }
            RoomOutcome::Joined { game_id, status } => {
                self.game_id = Some(game_id.clone());
                self.phase = match status {
                    GameStatus::Lobby => ConnectionPhase::Placement,
                    GameStatus::InProgress => ConnectionPhase::Battle,
                    GameStatus::Finished | GameStatus::Abandoned => ConnectionPhase::Finished,
                };
                Ok(Some(ServerMessage::GameJoined { game_id }))
            }
        }
    }

    async fn handle_start_bot_game(
        &mut self,
        difficulty: &str,
    ) -> Result<Option<ServerMessage>, GameError> {
        let game_id = self.service.create_bot_game(self.user(), difficulty).await?;
        self.game_id = Some(game_id.clone());
        self.phase = ConnectionPhase::Placement;
        Ok(Some(ServerMessage::GameJoined { game_id }))
    }

    async fn handle_fire_shot(&mut self, x: u8, y: u8) -> Result<Option<ServerMessage>, GameError> {
        let game_id = self.game();
        let outcome = self.service.fire_shot(self.user(), &game_id, x, y).await?;

        // In a bot session the opponent moves immediately and keeps moving
        // while it scores hits. Every shot reaches this connection through
        // the broadcast channel.
        if let Some(bot_id) = outcome.bot_id {
            let mut next = outcome.next_turn;
            while next.as_deref() == Some(bot_id.as_str()) {
                match self.service.bot_make_turn(&game_id).await {
                    Ok(turn) => next = turn.next_turn,
                    Err(err) => {
                        warn!("bot turn failed in game {}: {}", game_id, err);
                        break;
                    }
                }
            }
        }

        Ok(None)
    }

    /// Phase transitions driven by forwarded notifications, so queue matches
    /// and opponent actions move this connection without an inbound intent.
    fn observe(&mut self, msg: &ServerMessage) {
        match msg {
            ServerMessage::GameStarted { game_id, .. } => {
                self.game_id = Some(game_id.clone());
                self.phase = ConnectionPhase::Placement;
            }
            ServerMessage::AllReady => {
                self.phase = ConnectionPhase::Battle;
            }
            ServerMessage::ShotFired {
                result: ShotResult::Sink { game_over: true, .. },
                ..
            } => {
                self.phase = ConnectionPhase::Finished;
            }
            ServerMessage::GameForfeited { .. } => {
                self.phase = ConnectionPhase::Finished;
            }
            _ => {}
        }
    }

    fn cleanup(&mut self) {
        if let Some(user_id) = self.user_id.take() {
            self.service.sessions().unregister_connection(&user_id);
            self.service.leave_queue(&user_id);
            if let Some(game_id) = self.game_id.take() {
                self.service.sessions().detach(&game_id, &user_id);
            }
            debug!("connection for {} cleaned up", user_id);
        }
    }

    /// Map a wrong-phase intent to the taxonomy. Only called after
    /// `permits` rejected the message.
    fn phase_error(&self, msg: &ClientMessage) -> GameError {
        if self.phase == ConnectionPhase::Unauthenticated {
            return GameError::MissingAuth;
        }
        match msg {
            ClientMessage::Init { .. } => GameError::internal("already authenticated"),
            ClientMessage::SetBoard { .. } => match self.phase {
                ConnectionPhase::Battle | ConnectionPhase::Finished => {
                    GameError::InvalidPlacement
                }
                _ => GameError::NotInGame,
            },
            ClientMessage::FireShot { .. } => match self.phase {
                ConnectionPhase::Placement => GameError::NotYourTurn,
                _ => GameError::NotInGame,
            },
            ClientMessage::GetState | ClientMessage::Forfeit => GameError::NotInGame,
            ClientMessage::JoinQueue
            | ClientMessage::LeaveQueue
            | ClientMessage::JoinRoom { .. }
            | ClientMessage::StartBotGame { .. } => {
                GameError::internal("message not allowed in this phase")
            }
        }
    }

    /// Authenticated user id. Phase guards guarantee this is set for every
    /// post-`Init` intent.
    fn user(&self) -> &str {
        self.user_id.as_deref().unwrap_or_default()
    }

    /// Attached game id. Phase guards guarantee this is set in the
    /// placement, battle and finished phases.
    fn game(&self) -> String {
        self.game_id.clone().unwrap_or_default()
    }
}
