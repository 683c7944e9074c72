//! Unified error type for the facade.

use partyroom_protocol::{ProtocolError, RejectReason};
use partyroom_room::{RegistryError, RoomError, StoreError};

/// Anything that can go wrong when driving the engine.
#[derive(Debug, thiserror::Error)]
pub enum PartyroomError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PartyroomError {
    /// The typed rejection, if the room refused a request.
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Room(RoomError::Rejected(reason)) => Some(*reason),
            _ => None,
        }
    }
}
