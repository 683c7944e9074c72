//! Persistence hook for the selected game type.
//!
//! The engine keeps all authoritative state in memory; the store exists
//! so a deployment can record each room's selected game (for lobby
//! listings, analytics, crash recovery) in whatever backend it has.
//! Writes are best-effort from the room's point of view: a failed put is
//! logged and play continues.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use partyroom_protocol::{GameType, RoomCode};
use tokio::sync::Mutex;

use crate::StoreError;

/// Records each room's selected game type.
///
/// `Send + Sync + 'static` so one store instance can be shared across
/// every room actor for the lifetime of the process.
pub trait GameTypeStore: Send + Sync + 'static {
    /// Records (or overwrites) the selection for a room.
    fn put(
        &self,
        room_code: &RoomCode,
        game_type: GameType,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Looks up a previously recorded selection.
    fn get(
        &self,
        room_code: &RoomCode,
    ) -> impl Future<Output = Result<Option<GameType>, StoreError>> + Send;

    /// Removes the record when a room closes.
    fn remove(
        &self,
        room_code: &RoomCode,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-process store, the default for tests and single-node deployments.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<RoomCode, GameType>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameTypeStore for MemoryStore {
    async fn put(&self, room_code: &RoomCode, game_type: GameType) -> Result<(), StoreError> {
        self.inner.lock().await.insert(room_code.clone(), game_type);
        Ok(())
    }

    async fn get(&self, room_code: &RoomCode) -> Result<Option<GameType>, StoreError> {
        Ok(self.inner.lock().await.get(room_code).copied())
    }

    async fn remove(&self, room_code: &RoomCode) -> Result<(), StoreError> {
        self.inner.lock().await.remove(room_code);
        Ok(())
    }
}
