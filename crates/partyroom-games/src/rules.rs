//! The rule-variant contract and its shared guard rails.
//!
//! A rule variant is a pure function from (session, action) to either a
//! replacement session or a violation. Variants never touch clocks,
//! channels, or randomness, so the same action log always produces the
//! same session — the room actor relies on that for replay protection.

use partyroom_protocol::{Action, ActionKind, GameMove, GameType, Outcome, PlayerId, RejectReason};

use crate::session::GameSession;

/// A rejected move, with enough detail to tell the player why.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    /// The action's sequence is at or below the session watermark; it was
    /// already applied (or superseded) and must not be applied again.
    #[error("sequence {seq} already applied (watermark {watermark})")]
    StaleSequence { seq: u64, watermark: u64 },

    /// The game has already concluded.
    #[error("game is over")]
    GameOver,

    /// The player is not seated in this session.
    #[error("player {0} is not a participant")]
    NotAParticipant(PlayerId),

    /// The player was eliminated in an earlier round.
    #[error("player {0} is eliminated")]
    Eliminated(PlayerId),

    /// Someone else's equivalent move was sequenced first, or the player
    /// already made this round's call.
    #[error("call already made this round")]
    DuplicateCall,

    /// The player already acted this round in a one-action-per-round game.
    #[error("player already acted this round")]
    AlreadyActed,

    /// It is another player's turn.
    #[error("out of turn, expected {expected}")]
    OutOfTurn { expected: PlayerId },

    /// The move payload does not fit the game at this point.
    #[error("wrong move: {0}")]
    WrongMove(String),
}

impl RuleViolation {
    /// The wire-level rejection code for this violation.
    pub fn reject_reason(&self) -> RejectReason {
        match self {
            Self::StaleSequence { .. } => RejectReason::StaleSequence,
            Self::GameOver => RejectReason::GameOver,
            Self::NotAParticipant(_) => RejectReason::NotAParticipant,
            Self::Eliminated(_) => RejectReason::Eliminated,
            Self::DuplicateCall => RejectReason::DuplicateCall,
            Self::AlreadyActed => RejectReason::AlreadyActed,
            Self::OutOfTurn { .. } => RejectReason::OutOfTurn,
            Self::WrongMove(_) => RejectReason::WrongMove,
        }
    }
}

/// The result of a successfully applied move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// The replacement session state.
    pub session: GameSession,
    /// Copy of `session.outcome`, for callers that only branch on it.
    pub outcome: Outcome,
    /// Players this move eliminated, in seat order. Usually empty.
    pub eliminated: Vec<PlayerId>,
}

/// One game variant's judgment of moves.
///
/// Implementations must be deterministic and side-effect free.
pub trait GameRules: Send + Sync {
    fn game_type(&self) -> GameType;

    /// Judges one move against the current session.
    ///
    /// On success the returned session has `last_applied_seq` advanced to
    /// the action's sequence. On failure the caller keeps its session
    /// untouched.
    fn apply(&self, session: &GameSession, action: &Action) -> Result<Applied, RuleViolation>;
}

/// Checks every variant shares: sequence freshness, game still running,
/// actor seated and alive, payload is actually a move. Returns the move.
pub(crate) fn guard_move<'a>(
    session: &GameSession,
    action: &'a Action,
) -> Result<&'a GameMove, RuleViolation> {
    if action.server_sequence <= session.last_applied_seq {
        return Err(RuleViolation::StaleSequence {
            seq: action.server_sequence,
            watermark: session.last_applied_seq,
        });
    }
    if session.outcome != Outcome::Pending {
        return Err(RuleViolation::GameOver);
    }
    if !session.is_participant(&action.player_id) {
        return Err(RuleViolation::NotAParticipant(action.player_id.clone()));
    }
    if session.is_eliminated(&action.player_id) {
        return Err(RuleViolation::Eliminated(action.player_id.clone()));
    }
    match &action.kind {
        ActionKind::Move { game_move } => Ok(game_move),
        other => Err(RuleViolation::WrongMove(format!(
            "expected a game move, got {other:?}"
        ))),
    }
}

/// Winner/draw decision once eliminations settle: one survivor wins,
/// zero survivors draw, more than one means play continues.
pub(crate) fn settle(survivors: &[PlayerId]) -> Outcome {
    match survivors {
        [] => Outcome::Draw,
        [one] => Outcome::Winner { player_id: one.clone() },
        _ => Outcome::Pending,
    }
}
