//! Per-room game session state.
//!
//! A [`GameSession`] is a plain value: the room actor owns one while the
//! room is in Playing and hands immutable references to the rule engine,
//! which returns a replacement state rather than mutating in place. That
//! keeps the rules pure and makes replaying an action log reproduce the
//! exact same bytes.

use serde::{Deserialize, Serialize};

use partyroom_protocol::{GameType, Outcome, PlayerId, RoomCode};

/// One vote in a voting round (Two Truths and a Lie).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: PlayerId,
    pub target: PlayerId,
}

/// The full state of one game in progress.
///
/// Everything a rule variant needs to judge an action lives here;
/// the rules themselves hold no state. Serializes cleanly so the whole
/// session can be snapshotted or diffed in tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub room_code: RoomCode,
    pub game_type: GameType,
    /// Seat order, fixed at game start. Eliminated players stay listed.
    pub players: Vec<PlayerId>,
    /// 1-based. Advances when a round concludes without ending the game.
    pub round: u32,
    /// Distinct players who have acted this round, in first-action order.
    pub turn_sequence: Vec<PlayerId>,
    /// The shared count the round has reached (calls made, number said,
    /// ballots cast). Resets to zero on a round transition.
    pub called_count: u32,
    /// Accepted moves this round. Drives turn rotation for turn-cycling
    /// variants, where one player may act more than once per round.
    pub move_count: u32,
    /// Elimination order. Never shrinks.
    pub eliminated: Vec<PlayerId>,
    /// Votes collected this round. Only voting variants use it.
    pub ballots: Vec<Ballot>,
    pub outcome: Outcome,
    /// Highest server sequence applied so far. Replayed or reordered
    /// actions at or below this mark are rejected, never double-applied.
    pub last_applied_seq: u64,
}

impl GameSession {
    /// Starts a fresh session for the given seats.
    ///
    /// The caller (the room actor) is responsible for passing only the
    /// players that are actually present at game start.
    pub fn new(room_code: RoomCode, game_type: GameType, players: Vec<PlayerId>) -> Self {
        Self {
            room_code,
            game_type,
            players,
            round: 1,
            turn_sequence: Vec::new(),
            called_count: 0,
            move_count: 0,
            eliminated: Vec::new(),
            ballots: Vec::new(),
            outcome: Outcome::Pending,
            last_applied_seq: 0,
        }
    }

    pub fn is_participant(&self, id: &PlayerId) -> bool {
        self.players.contains(id)
    }

    pub fn is_eliminated(&self, id: &PlayerId) -> bool {
        self.eliminated.contains(id)
    }

    /// Players still in the game, in seat order.
    pub fn survivors(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| !self.eliminated.contains(p))
            .cloned()
            .collect()
    }

    /// Records an actor for this round, keeping the sequence duplicate-free.
    pub(crate) fn record_actor(&mut self, id: &PlayerId) {
        if !self.turn_sequence.contains(id) {
            self.turn_sequence.push(id.clone());
        }
    }

    /// Rolls into the next round: round counter up, per-round state cleared.
    /// Eliminations and the sequence watermark carry over.
    pub(crate) fn advance_round(&mut self) {
        self.round += 1;
        self.turn_sequence.clear();
        self.called_count = 0;
        self.move_count = 0;
        self.ballots.clear();
    }
}
