//! Inbound player actions and their sequencer stamps.
//!
//! An [`Action`] is transient: created by a client, stamped by the room's
//! sequencer on arrival, consumed exactly once by the session controller,
//! then discarded. The broadcast delta it produces is the durable record,
//! not the action itself.

use serde::{Deserialize, Serialize};

use crate::{GameType, PlayerId, RoomCode};

/// A game-specific move, opaque to the room plumbing.
///
/// Each variant belongs to one game type; the selected game's rules
/// reject moves from the wrong game with `WrongMove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameMove {
    /// Nunchi: claim the next ordinal position in the round.
    ///
    /// Clients send the ordinal they believe they are claiming (1-based)
    /// so the server can detect two players racing for the same position:
    /// the later-sequenced claim is rejected as a duplicate, not silently
    /// folded into the next ordinal.
    CallNext { ordinal: u32 },
    /// ThreeSixNine: speak the next number aloud.
    SayNumber { n: u32 },
    /// ThreeSixNine: clap instead of speaking (3/6/9 digits).
    Clap,
    /// BaskinRobbins31: advance the count to `n` (by 1–3).
    CountTo { n: u32 },
    /// TwoTruths: vote for the player whose statement is the lie.
    VoteLie { target: PlayerId },
}

/// What a player asked the room to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionKind {
    /// Toggle the ready flag (meaningful only in Lobby).
    SetReady { ready: bool },
    /// Host only: pick the game the room will play.
    SelectGameType { game_type: GameType },
    /// Host only: start the countdown.
    StartGame,
    /// A move for the selected game (Playing phase only).
    Move { game_move: GameMove },
}

/// A fully stamped inbound action.
///
/// `server_sequence` and `server_timestamp_ms` are assigned by the room's
/// sequencer on arrival and define the single total order every other
/// component relies on. `client_timestamp_ms` is advisory (latency
/// diagnostics only) — it never participates in arbitration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub player_id: PlayerId,
    pub room_code: RoomCode,
    pub kind: ActionKind,
    pub client_timestamp_ms: u64,
    pub server_sequence: u64,
    pub server_timestamp_ms: u64,
}
