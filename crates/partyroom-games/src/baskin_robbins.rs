//! Baskin Robbins 31: count toward 31 in turn, one to three numbers at
//! a time. Whoever is forced to say 31 is out; the count restarts with
//! the survivors until one player remains.

use partyroom_protocol::{Action, GameMove, GameType, Outcome, PlayerId};

use crate::rules::{guard_move, settle, Applied, GameRules, RuleViolation};
use crate::session::GameSession;

const LOSING_NUMBER: u32 = 31;
const MAX_STEP: u32 = 3;

#[derive(Debug, Default)]
pub struct BaskinRobbins31;

impl BaskinRobbins31 {
    fn expected_actor(session: &GameSession, survivors: &[PlayerId]) -> PlayerId {
        survivors[session.move_count as usize % survivors.len()].clone()
    }
}

impl GameRules for BaskinRobbins31 {
    fn game_type(&self) -> GameType {
        GameType::BaskinRobbins31
    }

    fn apply(&self, session: &GameSession, action: &Action) -> Result<Applied, RuleViolation> {
        let game_move = guard_move(session, action)?;
        let &GameMove::CountTo { n } = game_move else {
            return Err(RuleViolation::WrongMove(format!(
                "baskin robbins 31 only accepts count_to, got {game_move:?}"
            )));
        };

        let survivors = session.survivors();
        let expected = Self::expected_actor(session, &survivors);
        if action.player_id != expected {
            return Err(RuleViolation::OutOfTurn { expected });
        }

        if n <= session.called_count || n > session.called_count + MAX_STEP {
            return Err(RuleViolation::WrongMove(format!(
                "count_to {n} from {} must advance by 1 to {MAX_STEP}",
                session.called_count
            )));
        }
        if n > LOSING_NUMBER {
            return Err(RuleViolation::WrongMove(format!(
                "count_to {n} overshoots {LOSING_NUMBER}"
            )));
        }

        let mut next = session.clone();
        next.last_applied_seq = action.server_sequence;
        next.record_actor(&action.player_id);
        next.move_count += 1;
        next.called_count = n;

        if n < LOSING_NUMBER {
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
