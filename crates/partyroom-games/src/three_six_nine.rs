//! 3-6-9: count upward in turn, clap instead of speaking any number
//! whose decimal digits contain a 3, 6, or 9.
//!
//! Turns rotate through the survivors in seat order. A wrong clap, a
//! wrong number, or a missed clap eliminates the actor on the spot; the
//! count then restarts from 1 with the remaining players. Last player
//! standing wins.

use partyroom_protocol::{Action, GameMove, GameType, Outcome, PlayerId};

use crate::rules::{guard_move, settle, Applied, GameRules, RuleViolation};
use crate::session::GameSession;

#[derive(Debug, Default)]
pub struct ThreeSixNine;

/// Whether any decimal digit of `n` is 3, 6, or 9.
fn needs_clap(mut n: u32) -> bool {
    while n > 0 {
        if matches!(n % 10, 3 | 6 | 9) {
            return true;
        }
        n /= 10;
    }
    false
}

impl ThreeSixNine {
    fn expected_actor(session: &GameSession, survivors: &[PlayerId]) -> PlayerId {
        survivors[session.move_count as usize % survivors.len()].clone()
    }
}

impl GameRules for ThreeSixNine {
    fn game_type(&self) -> GameType {
        GameType::ThreeSixNine
    }

    fn apply(&self, session: &GameSession, action: &Action) -> Result<Applied, RuleViolation> {
        let game_move = guard_move(session, action)?;

        let survivors = session.survivors();
        let expected = Self::expected_actor(session, &survivors);
        if action.player_id != expected {
            return Err(RuleViolation::OutOfTurn { expected });
        }

        let n = session.called_count + 1;
        let correct = match game_move {
            GameMove::Clap => needs_clap(n),
            GameMove::SayNumber { n: said } => !needs_clap(n) && *said == n,
            other => {
                return Err(RuleViolation::WrongMove(format!(
                    "3-6-9 only accepts clap or say_number, got {other:?}"
                )));
            }
        };

        let mut next = session.clone();
        next.last_applied_seq = action.server_sequence;
        next.record_actor(&action.player_id);
        next.move_count += 1;

        if correct {
            next.called_count = n;
            return Ok(Applied { session: next, outcome: Outcome::Pending, eliminated: Vec::new() });
        }

        next.eliminated.push(action.player_id.clone());
        let remaining = next.survivors();
        next.outcome = settle(&remaining);
        if next.outcome == Outcome::Pending {
            next.advance_round();
        }

        Ok(Applied {
            outcome: next.outcome.clone(),
            eliminated: vec![action.player_id.clone()],
            session: next,
        })
    }
}
