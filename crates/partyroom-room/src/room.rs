//! Room actor: an isolated Tokio task that owns one room end to end.
//!
//! Each room runs in its own task and owns its roster, phase, sequencer,
//! countdown, and game session outright — no shared mutable state, just
//! message passing. Because the actor processes one wake-up at a time,
//! the per-room total order falls out for free: every action is stamped
//! and applied before the next one is even read.

use std::sync::Arc;
use std::time::Duration;

use partyroom_clock::{Countdown, Sequencer};
use partyroom_games::{GameRegistry, GameSession, RuleViolation};
use partyroom_protocol::{
    Action, ActionKind, EventEnvelope, GameType, Phase, PlayerId, RejectReason, RoomCode,
    ServerEvent,
};
use partyroom_roster::Roster;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::{BroadcastHub, GameTypeStore, PlayerSender, RoomConfig, RoomError};

/// Commands sent to a room actor through its channel.
///
/// Join and reconnect carry a reply channel because the caller must know
/// whether it holds a seat. Actions are fire-and-forget: their verdict
/// arrives on the player's event channel, in sequence order, like every
/// other state change.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        nickname: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    Reconnect {
        player_id: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// The player's connection dropped (their seat is kept).
    Disconnected { player_id: PlayerId },

    /// A player action, stamped and judged by the actor.
    Action {
        player_id: PlayerId,
        kind: ActionKind,
        client_timestamp_ms: u64,
    },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown { reason: String },
}

/// A snapshot of room metadata (not the game state itself).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_code: RoomCode,
    pub phase: Phase,
    pub game_type: Option<GameType>,
    pub player_count: usize,
    pub connected_count: usize,
    pub max_players: usize,
    /// Time since the actor last handled a command.
    pub idle: Duration,
}

/// Handle to a running room actor. Cheap to clone — an `mpsc::Sender`
/// wrapper plus the code.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_code(&self) -> &RoomCode {
        &self.room_code
    }

    /// Asks the room for a seat and subscribes the player's channel.
    pub async fn join(
        &self,
        player_id: PlayerId,
        nickname: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                nickname: nickname.into(),
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))?
    }

    /// Re-attaches a previously seated player after a connection drop.
    pub async fn reconnect(
        &self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Reconnect {
                player_id,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))?
    }

    /// Reports a dropped connection (fire-and-forget).
    pub async fn disconnected(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Disconnected { player_id })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))
    }

    /// Submits a player action (fire-and-forget). The verdict arrives on
    /// the player's event channel.
    pub async fn action(
        &self,
        player_id: PlayerId,
        kind: ActionKind,
        client_timestamp_ms: u64,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Action {
                player_id,
                kind,
                client_timestamp_ms,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))
    }

    /// Tells the room to close with the given reason.
    pub async fn shutdown(&self, reason: impl Into<String>) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown {
                reason: reason.into(),
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))
    }
}

/// What woke the actor loop up.
enum Wake {
    Command(Option<RoomCommand>),
    CountdownElapsed,
    SeatGraceExpired,
}

/// Pends until the given deadline, or forever when there is none.
async fn seat_expiry(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Whether the actor keeps running after handling a wake-up.
#[derive(PartialEq)]
enum Flow {
    Continue,
    Stop,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<S: GameTypeStore> {
    code: RoomCode,
    config: RoomConfig,
    phase: Phase,
    roster: Roster,
    hub: BroadcastHub,
    sequencer: Sequencer,
    countdown: Countdown,
    game_type: Option<GameType>,
    session: Option<GameSession>,
    rules: Arc<GameRegistry>,
    store: Arc<S>,
    receiver: mpsc::Receiver<RoomCommand>,
    last_activity: Instant,
}

impl<S: GameTypeStore> RoomActor<S> {
    /// Runs the actor loop until the room closes.
    ///
    /// The select returns a [`Wake`] value instead of handling inline so
    /// each arm can borrow the actor mutably without fighting the other.
    async fn run(mut self) {
        info!(room = %self.code, "room actor started");

        loop {
            // Held seats only lapse in Lobby; once a game is underway a
            // disconnected player keeps their place in it.
            let seat_deadline = if self.phase == Phase::Lobby {
                self.roster.next_expiry(self.config.reconnect_grace)
            } else {
                None
            };

            let wake = tokio::select! {
                cmd = self.receiver.recv() => Wake::Command(cmd),
                _ = self.countdown.elapsed() => Wake::CountdownElapsed,
                _ = seat_expiry(seat_deadline) => Wake::SeatGraceExpired,
            };

            let flow = match wake {
                Wake::Command(None) => Flow::Stop,
                Wake::Command(Some(cmd)) => {
                    self.last_activity = Instant::now();
                    self.handle_command(cmd).await
                }
                Wake::CountdownElapsed => {
                    self.last_activity = Instant::now();
                    self.begin_playing();
                    Flow::Continue
                }
                Wake::SeatGraceExpired => {
                    self.last_activity = Instant::now();
                    self.release_expired_seats();
                    Flow::Continue
                }
            };
            if flow == Flow::Stop {
                break;
            }
        }

        info!(room = %self.code, "room actor stopped");
    }

    async fn handle_command(&mut self, cmd: RoomCommand) -> Flow {
        match cmd {
            RoomCommand::Join {
                player_id,
                nickname,
                sender,
                reply,
            } => {
                let result = self.handle_join(player_id, nickname, sender);
                let _ = reply.send(result);
                Flow::Continue
            }
            RoomCommand::Reconnect {
                player_id,
                sender,
                reply,
            } => {
                let result = self.handle_reconnect(player_id, sender);
                let _ = reply.send(result);
                Flow::Continue
            }
            RoomCommand::Disconnected { player_id } => {
                self.handle_disconnected(player_id).await
            }
            RoomCommand::Action {
                player_id,
                kind,
                client_timestamp_ms,
            } => {
                self.handle_action(player_id, kind, client_timestamp_ms).await;
                Flow::Continue
            }
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
                Flow::Continue
            }
            RoomCommand::Shutdown { reason } => {
                self.close(&reason).await;
                Flow::Stop
            }
        }
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        nickname: String,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if !self.phase.is_joinable() {
            return Err(RoomError::Rejected(RejectReason::RoomNotJoinable));
        }
        self.roster
            .join(player_id.clone(), nickname)
            .map_err(|e| RoomError::Rejected(crate::roster_reject(&e)))?;
        self.hub.subscribe(player_id, sender);
        self.broadcast_roster();
        Ok(())
    }

    fn handle_reconnect(
        &mut self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        self.roster
            .mark_reconnected(&player_id)
            .map_err(|e| RoomError::Rejected(crate::roster_reject(&e)))?;
        self.hub.subscribe(player_id.clone(), sender);
        self.broadcast_roster();
        info!(room = %self.code, %player_id, "player reattached");
        Ok(())
    }

    async fn handle_disconnected(&mut self, player_id: PlayerId) -> Flow {
        let departure = match self.roster.mark_disconnected(&player_id) {
            Ok(d) => d,
            Err(_) => return Flow::Continue,
        };
        self.hub.unsubscribe(&player_id);

        // A countdown only runs when everyone was ready; losing anyone
        // invalidates that, and the phase machine has no way back to
        // Lobby. Close instead of starting a game missing a player.
        if self.phase == Phase::Countdown {
            self.close("player disconnected during countdown").await;
            return Flow::Stop;
        }

        if departure.was_host && departure.promoted.is_none() {
            self.close("last connected player left").await;
            return Flow::Stop;
        }

        self.broadcast_roster();
        Flow::Continue
    }

    async fn handle_action(
        &mut self,
        player_id: PlayerId,
        kind: ActionKind,
        client_timestamp_ms: u64,
    ) {
        let stamp = self.sequencer.stamp();
        let action = Action {
            player_id,
            room_code: self.code.clone(),
            kind,
            client_timestamp_ms,
            server_sequence: stamp.sequence,
            server_timestamp_ms: stamp.timestamp_ms,
        };

        match action.kind.clone() {
            ActionKind::SetReady { ready } => self.handle_set_ready(&action.player_id, ready),
            ActionKind::SelectGameType { game_type } => {
                self.handle_select_game_type(&action.player_id, game_type).await;
            }
            ActionKind::StartGame => self.handle_start_game(&action.player_id),
            ActionKind::Move { .. } => self.handle_move(&action),
        }
    }

    fn handle_set_ready(&mut self, player_id: &PlayerId, ready: bool) {
        if self.phase != Phase::Lobby {
            return self.reject(player_id, RejectReason::WrongPhase);
        }
        if self.roster.set_ready(player_id, ready).is_err() {
            return self.reject(player_id, RejectReason::NotAParticipant);
        }
        self.broadcast_roster();
    }

    async fn handle_select_game_type(&mut self, player_id: &PlayerId, game_type: GameType) {
        if !self.roster.is_host(player_id) {
            return self.reject(player_id, RejectReason::NotHost);
        }
        if self.phase != Phase::Lobby {
            return self.reject(player_id, RejectReason::GameTypeLocked);
        }
        if !self.rules.contains(game_type) {
            return self.reject(player_id, RejectReason::UnknownGameType);
        }

        self.game_type = Some(game_type);
        self.broadcast(ServerEvent::GameTypeSet { game_type });
        info!(room = %self.code, %game_type, "game type selected");

        // Best-effort persistence; in-memory state stays authoritative.
        if let Err(e) = self.store.put(&self.code, game_type).await {
            error!(room = %self.code, error = %e, "failed to persist game type");
        }
    }

    fn handle_start_game(&mut self, player_id: &PlayerId) {
        if !self.roster.is_host(player_id) {
            return self.reject(player_id, RejectReason::NotHost);
        }
        if self.phase != Phase::Lobby {
            return self.reject(player_id, RejectReason::WrongPhase);
        }
        if self.game_type.is_none() {
            return self.reject(player_id, RejectReason::GameTypeNotSet);
        }
        if self.roster.connected_count() < self.config.min_players {
            return self.reject(player_id, RejectReason::NotEnoughPlayers);
        }
        if !self.roster.all_ready() {
            return self.reject(player_id, RejectReason::NotAllReady);
        }

        self.phase = Phase::Countdown;
        let epoch = self.countdown.arm(self.config.countdown);
        // One event per transition: the countdown start is the phase
        // edge, clients infer Countdown from it.
        self.broadcast(ServerEvent::CountdownStarted {
            epoch_ms: epoch.epoch_ms,
            duration_ms: epoch.duration_ms,
        });
        info!(room = %self.code, duration_ms = epoch.duration_ms, "countdown started");
    }

    fn handle_move(&mut self, action: &Action) {
        if self.phase != Phase::Playing {
            return self.reject(&action.player_id, RejectReason::WrongPhase);
        }
        let Some(session) = self.session.as_ref() else {
            return self.reject(&action.player_id, RejectReason::WrongPhase);
        };
        let Some(rules) = self.rules.get(session.game_type) else {
            // The registry resolved this type at selection time; losing it
            // mid-game means a registry swap we do not support.
            error!(room = %self.code, game_type = %session.game_type, "no rules for running game");
            return self.reject(&action.player_id, RejectReason::UnknownGameType);
        };

        let applied = match rules.apply(session, action) {
            Ok(applied) => applied,
            Err(violation) => {
                // Consistency failures (stale sequences, players the
                // session never had) point at a confused client or a
                // protocol bug; ordinary rule rejections are routine.
                match &violation {
                    RuleViolation::StaleSequence { .. } | RuleViolation::NotAParticipant(_) => {
                        warn!(
                            room = %self.code,
                            player_id = %action.player_id,
                            %violation,
                            "inconsistent move dropped"
                        );
                    }
                    _ => debug!(
                        room = %self.code,
                        player_id = %action.player_id,
                        %violation,
                        "move rejected"
                    ),
                }
                return self.reject(&action.player_id, violation.reject_reason());
            }
        };

        self.broadcast(ServerEvent::MoveApplied {
            player_id: action.player_id.clone(),
            called_count: applied.session.called_count,
            round: applied.session.round,
        });
        if !applied.eliminated.is_empty() || !applied.outcome.is_pending() {
            self.broadcast(ServerEvent::RoundResult {
                outcome: applied.outcome.clone(),
                eliminated: applied.eliminated.clone(),
            });
        }
        if !applied.outcome.is_pending() {
            self.phase = Phase::Finished;
            self.broadcast(ServerEvent::PhaseChanged {
                phase: Phase::Finished,
            });
            info!(room = %self.code, outcome = ?applied.outcome, "game finished");
        }
        self.session = Some(applied.session);
    }

    /// Countdown deadline passed: enter Playing with whoever is seated.
    fn begin_playing(&mut self) {
        if self.phase != Phase::Countdown {
            warn!(room = %self.code, phase = %self.phase, "countdown fired outside Countdown");
            return;
        }
        let Some(game_type) = self.game_type else {
            // StartGame gates on a selected type, so this cannot happen
            // through the command path.
            error!(room = %self.code, "countdown elapsed with no game type");
            return;
        };

        self.session = Some(GameSession::new(
            self.code.clone(),
            game_type,
            self.roster.connected_ids(),
        ));
        self.phase = Phase::Playing;
        self.broadcast(ServerEvent::PhaseChanged {
            phase: Phase::Playing,
        });
        info!(room = %self.code, %game_type, "game started");
    }

    /// Drops every lobby seat whose reconnect grace has lapsed so the
    /// slots open up again.
    fn release_expired_seats(&mut self) {
        let expired = self.roster.expired_ids(self.config.reconnect_grace);
        if expired.is_empty() {
            return;
        }
        for player_id in &expired {
            if self.roster.remove(player_id).is_ok() {
                info!(room = %self.code, %player_id, "reconnect grace expired, seat released");
            }
        }
        self.broadcast_roster();
    }

    async fn close(&mut self, reason: &str) {
        info!(room = %self.code, reason, "room closing");
        self.broadcast(ServerEvent::RoomClosed {
            reason: reason.to_string(),
        });
        self.phase = Phase::Finished;
        if let Err(e) = self.store.remove(&self.code).await {
            error!(room = %self.code, error = %e, "failed to clear persisted game type");
        }
    }

    /// Stamps and fans out one event. Players whose channel is gone are
    /// marked disconnected so the roster converges on reality.
    fn broadcast(&mut self, event: ServerEvent) {
        let envelope = self.envelope(event);
        let failed = self.hub.broadcast(&envelope);
        for player_id in failed {
            warn!(room = %self.code, %player_id, "send failed, marking disconnected");
            let _ = self.roster.mark_disconnected(&player_id);
        }
    }

    fn broadcast_roster(&mut self) {
        self.broadcast(ServerEvent::RosterChanged {
            players: self.roster.snapshot(),
        });
    }

    /// Sends a rejection to the offending player only.
    fn reject(&mut self, player_id: &PlayerId, reason: RejectReason) {
        debug!(room = %self.code, %player_id, %reason, "action rejected");
        let envelope = self.envelope(ServerEvent::ActionRejected { reason });
        self.hub.send_to(player_id, envelope);
    }

    fn envelope(&mut self, event: ServerEvent) -> EventEnvelope {
        let stamp = self.sequencer.stamp();
        EventEnvelope {
            room_code: self.code.clone(),
            server_sequence: stamp.sequence,
            event,
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_code: self.code.clone(),
            phase: self.phase,
            game_type: self.game_type,
            player_count: self.roster.len(),
            connected_count: self.roster.connected_count(),
            max_players: self.config.max_players,
            idle: self.last_activity.elapsed(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// `channel_size` bounds the command channel — callers await room
/// capacity instead of piling up unbounded work.
pub(crate) fn spawn_room<S: GameTypeStore>(
    code: RoomCode,
    config: RoomConfig,
    rules: Arc<GameRegistry>,
    store: Arc<S>,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let max_players = config.max_players;

    let actor = RoomActor {
        code: code.clone(),
        config,
        phase: Phase::Lobby,
        roster: Roster::new(max_players),
        hub: BroadcastHub::new(),
        sequencer: Sequencer::new(),
        countdown: Countdown::new(),
        game_type: None,
        session: None,
        rules,
        store,
        receiver: rx,
        last_activity: Instant::now(),
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_code: code,
        sender: tx,
    }
}
