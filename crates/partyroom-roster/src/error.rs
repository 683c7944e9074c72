//! Error types for the roster layer.

use partyroom_protocol::PlayerId;

/// Errors that can occur during roster operations.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// The room is at its configured player cap.
    #[error("room is full (cap {0})")]
    RoomFull(usize),

    /// The player id is already on the roster.
    #[error("player {0} already joined")]
    AlreadyJoined(PlayerId),

    /// No roster entry exists for this player.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// The player is already in the requested presence state.
    #[error("player {0} already in that presence state")]
    PresenceUnchanged(PlayerId),
}
