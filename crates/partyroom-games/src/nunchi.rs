//! Nunchi: claim the next number before anyone else.
//!
//! With N players, the counts 1..N-1 are up for grabs in no fixed
//! order, and a bold player may claim several in a row. Everyone who
//! never got a count in is eliminated together when the last count
//! lands, and the game concludes immediately. When more than one
//! claimant survives, the earliest-sequenced caller wins — the server's
//! arrival order is the tie-break.

use partyroom_protocol::{Action, GameMove, GameType, Outcome};

use crate::rules::{guard_move, Applied, GameRules, RuleViolation};
use crate::session::GameSession;

#[derive(Debug, Default)]
pub struct Nunchi;

impl GameRules for Nunchi {
    fn game_type(&self) -> GameType {
        GameType::Nunchi
    }

    fn apply(&self, session: &GameSession, action: &Action) -> Result<Applied, RuleViolation> {
        let game_move = guard_move(session, action)?;
        let &GameMove::CallNext { ordinal } = game_move else {
            return Err(RuleViolation::WrongMove(format!(
                "nunchi only accepts call_next, got {game_move:?}"
            )));
        };

        // No re-claiming a count that has already been sequenced: the
        // later arrival loses the race. Claiming several counts in a
        // row is allowed — hesitating is the only way to lose.
        let expected = session.called_count + 1;
        if ordinal < expected {
            return Err(RuleViolation::DuplicateCall);
        }
        if ordinal > expected {
            return Err(RuleViolation::WrongMove(format!(
                "count {ordinal} claimed before {expected}"
            )));
        }

        let survivors = session.survivors();
        let mut next = session.clone();
        next.last_applied_seq = action.server_sequence;
        next.record_actor(&action.player_id);
        next.called_count = expected;
        next.move_count += 1;

        // Counts run out at N-1; the round and the game end together.
        if next.called_count + 1 < survivors.len() as u32 {
            return Ok(Applied { session: next, outcome: Outcome::Pending, eliminated: Vec::new() });
        }

        let newly_eliminated: Vec<_> = survivors
            .iter()
            .filter(|p| !next.turn_sequence.contains(p))
            .cloned()
            .collect();
        next.eliminated.extend(newly_eliminated.iter().cloned());

        let remaining = next.survivors();
        next.outcome = match remaining.len() {
            0 => Outcome::Draw,
            1 => Outcome::Winner { player_id: remaining[0].clone() },
            _ => Outcome::Winner { player_id: next.turn_sequence[0].clone() },
        };

        Ok(Applied {
            outcome: next.outcome.clone(),
            eliminated: newly_eliminated,
            session: next,
        })
    }
}
