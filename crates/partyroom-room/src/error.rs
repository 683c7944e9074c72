//! Error types for the room layer.

use partyroom_protocol::{RejectReason, RoomCode};
use partyroom_roster::RosterError;

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No room exists under this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room's command channel is full or the actor is gone.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),

    /// The room refused the request; the reason says why.
    #[error("rejected: {0}")]
    Rejected(RejectReason),
}

/// Errors that can occur while creating rooms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Random code generation kept colliding with live rooms.
    #[error("no free room code after {attempts} attempts")]
    CodesExhausted { attempts: usize },
}

/// A failure in the game-type persistence backend.
///
/// Persistence is best-effort: the room logs the failure and play
/// continues from in-memory state, so this only surfaces to callers
/// reading the store directly.
#[derive(Debug, Clone, thiserror::Error)]
#[error("game type store: {0}")]
pub struct StoreError(pub String);

/// Maps a roster failure onto the wire-level rejection vocabulary.
pub(crate) fn roster_reject(error: &RosterError) -> RejectReason {
    match error {
        RosterError::RoomFull(_) => RejectReason::RoomFull,
        RosterError::AlreadyJoined(_) | RosterError::PresenceUnchanged(_) => {
            RejectReason::AlreadyJoined
        }
        RosterError::UnknownPlayer(_) => RejectReason::NotAParticipant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partyroom_protocol::PlayerId;

    #[test]
    fn test_roster_reject_mapping() {
        let pid = PlayerId::new("p1");
        assert_eq!(roster_reject(&RosterError::RoomFull(8)), RejectReason::RoomFull);
        assert_eq!(
            roster_reject(&RosterError::AlreadyJoined(pid.clone())),
            RejectReason::AlreadyJoined
        );
        assert_eq!(
            roster_reject(&RosterError::UnknownPlayer(pid)),
            RejectReason::NotAParticipant
        );
    }
}
