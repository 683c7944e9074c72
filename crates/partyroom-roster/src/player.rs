//! Player record types: who is in the room and in what state.

use partyroom_protocol::{PlayerId, PlayerSnapshot};
use tokio::time::Instant;

/// Whether a player's connection is currently live.
///
/// A disconnect does not remove the player: their game-relevant state
/// (eliminations, turn bookkeeping) must stay consistent if they return
/// within the reconnect grace. Lobby seats lapse once the grace runs
/// out (see `Roster::expired_ids`); in-game seats are held until the
/// room closes. Tokio's `Instant` is monotonic and follows the
/// runtime clock, so elapsed-time checks are immune to wall-clock
/// adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Connected,
    Disconnected { since: Instant },
}

impl Presence {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// One roster entry.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    /// Meaningful only while the room is in Lobby.
    pub is_ready: bool,
    /// Exactly one host per room while any connected player remains.
    pub is_host: bool,
    pub presence: Presence,
    /// Updated on join, reconnect, and disconnect.
    pub last_seen: Instant,
}

impl Player {
    pub(crate) fn new(id: PlayerId, nickname: String, is_host: bool) -> Self {
        Self {
            id,
            nickname,
            is_ready: false,
            is_host,
            presence: Presence::Connected,
            last_seen: Instant::now(),
        }
    }

    /// The wire-format view of this entry.
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id.clone(),
            nickname: self.nickname.clone(),
            is_ready: self.is_ready,
            is_host: self.is_host,
            connected: self.presence.is_connected(),
        }
    }
}
