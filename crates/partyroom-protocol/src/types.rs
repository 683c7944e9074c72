//! Core identity and lifecycle types shared by every Partyroom layer.
//!
//! Everything here either travels on the wire (serialized to JSON by the
//! codec) or names a thing both sides of the wire agree on: who a player
//! is, which room they are in, which game the room will play, and where
//! the room is in its lifecycle.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// An opaque, client-supplied player identifier.
///
/// The joining client generates this once and persists it locally, so the
/// same identity survives a disconnect/reconnect within a session. The
/// server never interprets the contents — it only compares them.
///
/// `#[serde(transparent)]` keeps the JSON representation a plain string.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A short, human-typeable room join code.
///
/// Codes are 4–6 ASCII alphanumeric characters and case-insensitive:
/// `parse` normalizes to uppercase, so `"ab12"` and `"AB12"` name the
/// same room. This is the only externally visible wire-format artifact
/// of the engine.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    pub const MIN_LEN: usize = 4;
    pub const MAX_LEN: usize = 6;

    /// Parses and normalizes a join code.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidRoomCode`] if the code is not
    /// 4–6 ASCII alphanumeric characters.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let trimmed = raw.trim();
        if trimmed.len() < Self::MIN_LEN || trimmed.len() > Self::MAX_LEN {
            return Err(ProtocolError::InvalidRoomCode(raw.to_string()));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProtocolError::InvalidRoomCode(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

// ---------------------------------------------------------------------------
// GameType
// ---------------------------------------------------------------------------

/// The playable game variants registered with the rule engine.
///
/// Selected once by the host while the room is in Lobby; immutable after
/// that. Adding a variant here means adding a `GameRules` implementation
/// for it — nothing in the room/session plumbing changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    /// Unordered number calling; whoever hesitates is eliminated.
    Nunchi,
    /// Count in turn, clap on every number containing 3, 6 or 9.
    ThreeSixNine,
    /// Vote for the player whose statement is the lie.
    TwoTruths,
    /// Count up to 31 in steps of 1–3; whoever says 31 is out.
    BaskinRobbins31,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nunchi => write!(f, "Nunchi"),
            Self::ThreeSixNine => write!(f, "ThreeSixNine"),
            Self::TwoTruths => write!(f, "TwoTruths"),
            Self::BaskinRobbins31 => write!(f, "BaskinRobbins31"),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a room.
///
/// Transitions are strictly ordered and acyclic — no phase is ever
/// revisited:
///
/// ```text
/// Lobby → Countdown → Playing → Finished
/// ```
///
/// - **Lobby**: players join, toggle ready, the host selects a game.
/// - **Countdown**: the host started the game; a server-scheduled timer
///   is running. No client input can advance or cancel it.
/// - **Playing**: the game rules process player actions.
/// - **Finished**: terminal. A new round requires a fresh room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Lobby,
    Countdown,
    Playing,
    Finished,
}

impl Phase {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// The next phase in the strict ordering, or `None` from `Finished`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Lobby => Some(Self::Countdown),
            Self::Countdown => Some(Self::Playing),
            Self::Playing => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Countdown => write!(f, "Countdown"),
            Self::Playing => write!(f, "Playing"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The result of a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Outcome {
    /// The round is still in progress.
    Pending,
    /// Exactly one player survived (or won the sequence tie-break).
    Winner { player_id: PlayerId },
    /// Elimination removed the last survivors simultaneously.
    Draw,
}

impl Outcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

// ---------------------------------------------------------------------------
// RejectReason
// ---------------------------------------------------------------------------

/// Typed reason attached to an `ActionRejected` event.
///
/// Delivered to the offending client only, never broadcast. Clients
/// render these as a toast/inline message; the engine never silently
/// swallows a player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Only the host may perform this action.
    NotHost,
    /// The room is past Lobby; late joins are rejected by design.
    RoomNotJoinable,
    /// The room is at its player cap.
    RoomFull,
    /// This player id is already in the room.
    AlreadyJoined,
    /// The host tried to start before selecting a game.
    GameTypeNotSet,
    /// The game type cannot change once the room left Lobby.
    GameTypeLocked,
    /// The requested game type is not in the registry.
    UnknownGameType,
    /// A connected non-host player is not ready.
    NotAllReady,
    /// Fewer connected players than the configured minimum.
    NotEnoughPlayers,
    /// The action is not valid in the room's current phase.
    WrongPhase,
    /// A later-sequenced call for an ordinal already claimed.
    DuplicateCall,
    /// The player already acted this round.
    AlreadyActed,
    /// It is another player's turn.
    OutOfTurn,
    /// The move is malformed for the selected game.
    WrongMove,
    /// The acting player is not part of this game session.
    NotAParticipant,
    /// The acting player was already eliminated.
    Eliminated,
    /// The action's sequence number was already processed (replay).
    StaleSequence,
    /// The session already has a non-pending outcome.
    GameOver,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

// =========================================================================
// Tests
// =========================================================================
