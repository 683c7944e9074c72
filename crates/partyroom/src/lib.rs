//! # Partyroom
//!
//! Real-time party-game room engine: short join codes, a ready gate, a
//! host-authoritative start with a server-synchronized countdown, and a
//! pluggable set of elimination games, all broadcast over per-room
//! ordered event streams.
//!
//! The engine is transport-agnostic — it speaks channels, not sockets.
//! An embedding server maps each client connection onto one
//! [`PlayerSender`] and forwards the client's requests into a
//! [`RoomService`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use partyroom::prelude::*;
//! use tokio::sync::mpsc;
//!
//! # async fn demo() -> Result<(), PartyroomError> {
//! let service = RoomService::new();
//! let code = service.create_room().await?;
//!
//! let (tx, mut events) = mpsc::unbounded_channel();
//! service
//!     .join_room(code.as_str(), PlayerId::new("p1"), "Mina", tx)
//!     .await?;
//!
//! while let Some(envelope) = events.recv().await {
//!     println!("seq {} -> {:?}", envelope.server_sequence, envelope.event);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod service;

pub use error::PartyroomError;
pub use service::{RoomService, RoomServiceBuilder};

pub use partyroom_games::{Applied, GameRegistry, GameRules, GameSession, RuleViolation};
pub use partyroom_protocol::{
    Action, ActionKind, EventEnvelope, GameMove, GameType, Outcome, Phase, PlayerId,
    PlayerSnapshot, RejectReason, RoomCode, ServerEvent,
};
pub use partyroom_room::{
    GameTypeStore, MemoryStore, PlayerSender, RegistryConfig, RoomConfig, RoomError, RoomInfo,
};

/// The names most embedders need.
pub mod prelude {
    pub use crate::{
        ActionKind, EventEnvelope, GameMove, GameType, Outcome, PartyroomError, Phase, PlayerId,
        PlayerSender, RejectReason, RoomCode, RoomService, ServerEvent,
    };
}

/// Installs a formatted `tracing` subscriber honoring `RUST_LOG`
/// (defaulting to `info`). Safe to call more than once; later calls are
/// no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
