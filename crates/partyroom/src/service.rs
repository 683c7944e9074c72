//! `RoomService`: the one object an embedding server talks to.
//!
//! The service wraps the room registry behind a mutex and exposes the
//! full operation set as plain async methods. Handles are cloned out of
//! the registry before any room call, so the lock is never held across
//! an actor round-trip.

use std::sync::Arc;
use std::time::Duration;

use partyroom_games::GameRegistry;
use partyroom_protocol::{ActionKind, GameMove, GameType, PlayerId, RoomCode};
use partyroom_room::{
    GameTypeStore, MemoryStore, PlayerSender, RegistryConfig, RoomError, RoomHandle, RoomInfo,
    RoomRegistry,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use crate::PartyroomError;

/// Builder for configuring a [`RoomService`].
pub struct RoomServiceBuilder {
    config: RegistryConfig,
    rules: GameRegistry,
}

impl RoomServiceBuilder {
    pub fn new() -> Self {
        Self {
            config: RegistryConfig::default(),
            rules: GameRegistry::standard(),
        }
    }

    /// Overrides the registry configuration.
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the game registry (e.g. to add a custom variant).
    pub fn rules(mut self, rules: GameRegistry) -> Self {
        self.rules = rules;
        self
    }

    /// Builds a service with the in-process store.
    pub fn build(self) -> RoomService<MemoryStore> {
        self.build_with_store(MemoryStore::new())
    }

    /// Builds a service backed by the given store.
    pub fn build_with_store<S: GameTypeStore>(self, store: S) -> RoomService<S> {
        RoomService {
            registry: Arc::new(Mutex::new(RoomRegistry::new(
                self.config,
                Arc::new(self.rules),
                Arc::new(store),
            ))),
        }
    }
}

impl Default for RoomServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The engine facade. Cheap to clone; all clones share one registry.
pub struct RoomService<S: GameTypeStore = MemoryStore> {
    registry: Arc<Mutex<RoomRegistry<S>>>,
}

impl<S: GameTypeStore> Clone for RoomService<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl RoomService<MemoryStore> {
    /// A service with default configuration, the standard game set, and
    /// the in-process store.
    pub fn new() -> Self {
        RoomServiceBuilder::new().build()
    }

    pub fn builder() -> RoomServiceBuilder {
        RoomServiceBuilder::new()
    }
}

impl Default for RoomService<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GameTypeStore> RoomService<S> {
    /// Creates a room and returns its join code.
    pub async fn create_room(&self) -> Result<RoomCode, PartyroomError> {
        let code = self.registry.lock().await.create_room()?;
        Ok(code)
    }

    /// Joins a room by raw, human-typed code ("ab12" finds AB12) and
    /// subscribes the player's event channel. Returns the normalized
    /// code.
    pub async fn join_room(
        &self,
        raw_code: &str,
        player_id: PlayerId,
        nickname: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<RoomCode, PartyroomError> {
        let code = RoomCode::parse(raw_code)?;
        let handle = self.handle(&code).await?;
        handle.join(player_id, nickname, sender).await?;
        Ok(code)
    }

    /// Re-attaches a disconnected player with a fresh event channel.
    pub async fn reconnect(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), PartyroomError> {
        let handle = self.handle(code).await?;
        handle.reconnect(player_id, sender).await?;
        Ok(())
    }

    /// Reports that a player's connection dropped.
    pub async fn disconnect(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
    ) -> Result<(), PartyroomError> {
        let handle = self.handle(code).await?;
        handle.disconnected(player_id).await?;
        Ok(())
    }

    pub async fn set_ready(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        ready: bool,
    ) -> Result<(), PartyroomError> {
        self.action(code, player_id, ActionKind::SetReady { ready }, 0)
            .await
    }

    /// Host only: selects the game the room will play.
    pub async fn select_game_type(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        game_type: GameType,
    ) -> Result<(), PartyroomError> {
        self.action(code, player_id, ActionKind::SelectGameType { game_type }, 0)
            .await
    }

    /// Host only: starts the countdown.
    pub async fn start_game(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
    ) -> Result<(), PartyroomError> {
        self.action(code, player_id, ActionKind::StartGame, 0).await
    }

    /// Submits a game move. The verdict arrives on the player's event
    /// channel in sequence order.
    pub async fn game_move(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        game_move: GameMove,
        client_timestamp_ms: u64,
    ) -> Result<(), PartyroomError> {
        self.action(
            code,
            player_id,
            ActionKind::Move { game_move },
            client_timestamp_ms,
        )
        .await
    }

    pub async fn room_info(&self, code: &RoomCode) -> Result<RoomInfo, PartyroomError> {
        let handle = self.handle(code).await?;
        Ok(handle.info().await?)
    }

    pub async fn close_room(
        &self,
        code: &RoomCode,
        reason: impl Into<String>,
    ) -> Result<(), PartyroomError> {
        self.registry.lock().await.close_room(code, reason).await?;
        Ok(())
    }

    /// Runs one garbage-collection pass; returns rooms removed.
    pub async fn sweep(&self) -> usize {
        self.registry.lock().await.sweep().await
    }

    pub async fn room_count(&self) -> usize {
        self.registry.lock().await.room_count()
    }

    /// Spawns a background task sweeping dead rooms on an interval.
    /// Runs until the caller aborts the returned handle.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let swept = service.sweep().await;
                if swept > 0 {
                    info!(swept, "sweeper pass removed rooms");
                }
            }
        })
    }

    async fn handle(&self, code: &RoomCode) -> Result<RoomHandle, PartyroomError> {
        self.registry
            .lock()
            .await
            .find(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()).into())
    }

    async fn action(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        kind: ActionKind,
        client_timestamp_ms: u64,
    ) -> Result<(), PartyroomError> {
        let handle = self.handle(code).await?;
        handle.action(player_id, kind, client_timestamp_ms).await?;
        Ok(())
    }
}
