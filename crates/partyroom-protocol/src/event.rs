//! Outbound broadcast events: the state deltas every room member applies.
//!
//! Each event travels inside an [`EventEnvelope`] carrying the room code
//! and a per-room `server_sequence`. Delivery is at-least-once; clients
//! drop duplicates by sequence number. Within one room the sequence is
//! total and never reordered.

use serde::{Deserialize, Serialize};

use crate::{GameType, Outcome, Phase, PlayerId, RejectReason, RoomCode};

/// A snapshot of one roster entry, broadcast whenever the roster changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub nickname: String,
    pub is_ready: bool,
    pub is_host: bool,
    pub connected: bool,
}

/// A state delta emitted by a room's session controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// The roster changed: join, ready toggle, presence, host transfer.
    RosterChanged { players: Vec<PlayerSnapshot> },

    /// The host selected the game the room will play.
    GameTypeSet { game_type: GameType },

    /// The countdown began. Every client renders remaining time as a
    /// pure function of `now - epoch_ms` — no client-side timer drives
    /// the transition, which is what keeps the countdown synchronized
    /// despite per-client latency.
    CountdownStarted { epoch_ms: u64, duration_ms: u64 },

    /// The room entered a new phase.
    PhaseChanged { phase: Phase },

    /// A move was accepted and applied by the game rules.
    MoveApplied {
        player_id: PlayerId,
        called_count: u32,
        round: u32,
    },

    /// An action was rejected. Sent to the offending player only.
    ActionRejected { reason: RejectReason },

    /// The round produced eliminations and/or a final outcome. All
    /// simultaneous eliminations arrive in one event.
    RoundResult {
        outcome: Outcome,
        eliminated: Vec<PlayerId>,
    },

    /// The room is gone; no further events will arrive.
    RoomClosed { reason: String },
}

/// The top-level wrapper around every broadcast event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub room_code: RoomCode,
    /// Per-room, strictly increasing. Duplicate deliveries share the
    /// same value so subscribers can de-duplicate.
    pub server_sequence: u64,
    pub event: ServerEvent,
}
