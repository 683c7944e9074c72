//! Room registry: mints join codes, creates rooms, and sweeps the dead.

use std::collections::HashMap;
use std::sync::Arc;

use partyroom_games::GameRegistry;
use partyroom_protocol::{Phase, RoomCode};
use rand::Rng;
use tracing::{info, warn};

use crate::room::spawn_room;
use crate::{GameTypeStore, RegistryConfig, RegistryError, RoomError, RoomHandle};

/// Join-code alphabet with the look-alikes removed (no 0/O, 1/I/L), so
/// codes survive being read aloud across a living room.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Creates and tracks all live rooms, keyed by join code.
///
/// This is the entry point for room operations from higher layers. It
/// holds one [`RoomHandle`] per room; the rooms themselves run as
/// independent actors.
pub struct RoomRegistry<S: GameTypeStore> {
    rooms: HashMap<RoomCode, RoomHandle>,
    config: RegistryConfig,
    rules: Arc<GameRegistry>,
    store: Arc<S>,
}

impl<S: GameTypeStore> RoomRegistry<S> {
    pub fn new(config: RegistryConfig, rules: Arc<GameRegistry>, store: Arc<S>) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
            rules,
            store,
        }
    }

    /// Creates a new room under a freshly minted code.
    ///
    /// # Errors
    /// [`RegistryError::CodesExhausted`] if every generated code collided
    /// with a live room — in practice a sign the registry is overloaded,
    /// not bad luck.
    pub fn create_room(&mut self) -> Result<RoomCode, RegistryError> {
        let code = self.mint_code()?;
        let handle = spawn_room(
            code.clone(),
            self.config.room.clone(),
            Arc::clone(&self.rules),
            Arc::clone(&self.store),
            self.config.channel_size,
        );
        self.rooms.insert(code.clone(), handle);
        info!(room = %code, rooms = self.rooms.len(), "room created");
        Ok(code)
    }

    /// Looks up a live room by its (already normalized) code.
    pub fn find(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(code).cloned()
    }

    /// Closes a room and removes it from the index.
    pub async fn close_room(
        &mut self,
        code: &RoomCode,
        reason: impl Into<String>,
    ) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let _ = handle.shutdown(reason.into()).await;
        info!(room = %code, "room closed");
        Ok(())
    }

    /// Closes finished rooms, rooms idle past the timeout with nobody
    /// connected, and rooms whose actor already died. Returns how many
    /// were removed.
    pub async fn sweep(&mut self) -> usize {
        let mut doomed = Vec::new();
        for (code, handle) in &self.rooms {
            match handle.info().await {
                Ok(info) => {
                    let abandoned =
                        info.connected_count == 0 && info.idle >= self.config.idle_timeout;
                    if info.phase == Phase::Finished || abandoned {
                        doomed.push(code.clone());
                    }
                }
                Err(_) => {
                    warn!(room = %code, "room actor gone, removing handle");
                    doomed.push(code.clone());
                }
            }
        }

        let count = doomed.len();
        for code in doomed {
            if let Some(handle) = self.rooms.remove(&code) {
                let _ = handle.shutdown("room expired").await;
            }
        }
        if count > 0 {
            info!(swept = count, rooms = self.rooms.len(), "sweep complete");
        }
        count
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }

    fn mint_code(&self) -> Result<RoomCode, RegistryError> {
        let mut rng = rand::rng();
        for _ in 0..self.config.max_code_attempts {
            let raw: String = (0..self.config.code_length)
                .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            // The alphabet is uppercase alphanumeric, so parse always
            // succeeds; going through it keeps normalization in one place.
            let Ok(code) = RoomCode::parse(&raw) else {
                continue;
            };
            if !self.rooms.contains_key(&code) {
                return Ok(code);
            }
        }
        Err(RegistryError::CodesExhausted {
            attempts: self.config.max_code_attempts,
        })
    }
}
