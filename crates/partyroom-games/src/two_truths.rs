//! Two Truths and a Lie: each round every survivor votes for the player
//! they think is lying. The most-voted player is eliminated when the
//! last ballot lands; seat order breaks ties. Votes arrive in any order.

use partyroom_protocol::{Action, GameMove, GameType, Outcome, PlayerId};

use crate::rules::{guard_move, settle, Applied, GameRules, RuleViolation};
use crate::session::{Ballot, GameSession};

#[derive(Debug, Default)]
pub struct TwoTruths;

impl TwoTruths {
    /// The survivor with the most ballots against them. Ballots exist,
    /// and every target is a survivor, so a winner of the tally exists.
    fn most_voted(session: &GameSession, survivors: &[PlayerId]) -> Option<PlayerId> {
        survivors
            .iter()
            .map(|p| {
                let votes = session.ballots.iter().filter(|b| b.target == *p).count();
                (p, votes)
            })
            // Seat order wins ties: max_by picks the last maximum, so scan
            // in reverse seat order.
            .rev()
            .max_by_key(|(_, votes)| *votes)
            .filter(|(_, votes)| *votes > 0)
            .map(|(p, _)| p.clone())
    }
}

impl GameRules for TwoTruths {
    fn game_type(&self) -> GameType {
        GameType::TwoTruths
    }

    fn apply(&self, session: &GameSession, action: &Action) -> Result<Applied, RuleViolation> {
        let game_move = guard_move(session, action)?;
        let GameMove::VoteLie { target } = game_move else {
            return Err(RuleViolation::WrongMove(format!(
                "two truths only accepts vote_lie, got {game_move:?}"
            )));
        };

        if session.turn_sequence.contains(&action.player_id) {
            return Err(RuleViolation::AlreadyActed);
        }
        if *target == action.player_id {
            return Err(RuleViolation::WrongMove("cannot vote for yourself".into()));
        }
        if !session.is_participant(target) {
            return Err(RuleViolation::NotAParticipant(target.clone()));
        }
        if session.is_eliminated(target) {
            return Err(RuleViolation::WrongMove(format!(
                "target {target} is already eliminated"
            )));
        }

        let survivors = session.survivors();
        let mut next = session.clone();
        next.last_applied_seq = action.server_sequence;
        next.record_actor(&action.player_id);
        next.move_count += 1;
        next.called_count += 1;
        next.ballots.push(Ballot {
            voter: action.player_id.clone(),
            target: target.clone(),
        });

        if (next.move_count as usize) < survivors.len() {
            return Ok(Applied { session: next, outcome: Outcome::Pending, eliminated: Vec::new() });
        }

        let Some(voted_out) = Self::most_voted(&next, &survivors) else {
            // Unreachable with a full ballot box, but never panic in the
            // rules path: treat it as a no-elimination round.
            next.advance_round();
            return Ok(Applied { session: next, outcome: Outcome::Pending, eliminated: Vec::new() });
        };

        next.eliminated.push(voted_out.clone());
        let remaining = next.survivors();
        next.outcome = settle(&remaining);
        if next.outcome == Outcome::Pending {
            next.advance_round();
        }

        Ok(Applied {
            outcome: next.outcome.clone(),
            eliminated: vec![voted_out],
            session: next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partyroom_protocol::{ActionKind, RoomCode};

    fn pid(s: &str) -> PlayerId {
        PlayerId(s.to_string())
    }

    fn session(players: &[&str]) -> GameSession {
        GameSession::new(
            RoomCode::parse("AB12").unwrap(),
            GameType::TwoTruths,
            players.iter().map(|p| pid(p)).collect(),
        )
    }

    fn vote(player: &str, target: &str, seq: u64) -> Action {
        Action {
            player_id: pid(player),
            room_code: RoomCode::parse("AB12").unwrap(),
            kind: ActionKind::Move {
                game_move: GameMove::VoteLie { target: pid(target) },
            },
            client_timestamp_ms: 0,
            server_sequence: seq,
            server_timestamp_ms: 0,
        }
    }

    #[test]
    fn test_votes_accepted_in_any_order() {
        let s = session(&["p1", "p2", "p3"]);
        let s = TwoTruths.apply(&s, &vote("p3", "p1", 1)).unwrap().session;
        let applied = TwoTruths.apply(&s, &vote("p1", "p3", 2)).unwrap();

        assert_eq!(applied.outcome, Outcome::Pending);
        assert_eq!(applied.session.ballots.len(), 2);
    }

    #[test]
    fn test_second_vote_from_same_player_rejected() {
        let s = session(&["p1", "p2", "p3"]);
        let s = TwoTruths.apply(&s, &vote("p1", "p2", 1)).unwrap().session;

        let err = TwoTruths.apply(&s, &vote("p1", "p3", 2)).unwrap_err();
        assert!(matches!(err, RuleViolation::AlreadyActed));
    }

    #[test]
    fn test_self_vote_rejected() {
        let s = session(&["p1", "p2", "p3"]);
        let err = TwoTruths.apply(&s, &vote("p1", "p1", 1)).unwrap_err();
        assert!(matches!(err, RuleViolation::WrongMove(_)));
    }

    #[test]
    fn test_vote_for_outsider_rejected() {
        let s = session(&["p1", "p2", "p3"]);
        let err = TwoTruths.apply(&s, &vote("p1", "ghost", 1)).unwrap_err();
        assert!(matches!(err, RuleViolation::NotAParticipant(_)));
    }

    #[test]
    fn test_last_ballot_eliminates_majority_target() {
        let s = session(&["p1", "p2", "p3"]);
        let s = TwoTruths.apply(&s, &vote("p1", "p3", 1)).unwrap().session;
        let s = TwoTruths.apply(&s, &vote("p2", "p3", 2)).unwrap().session;
        let applied = TwoTruths.apply(&s, &vote("p3", "p1", 3)).unwrap();

        assert_eq!(applied.eliminated, vec![pid("p3")]);
        assert_eq!(applied.outcome, Outcome::Pending);
        assert_eq!(applied.session.round, 2);
        assert!(applied.session.ballots.is_empty());
    }

    #[test]
    fn test_tie_breaks_by_seat_order() {
        let s = session(&["p1", "p2", "p3", "p4"]);
        let s = TwoTruths.apply(&s, &vote("p1", "p2", 1)).unwrap().session;
        let s = TwoTruths.apply(&s, &vote("p2", "p1", 2)).unwrap().session;
        let s = TwoTruths.apply(&s, &vote("p3", "p2", 3)).unwrap().session;
        let applied = TwoTruths.apply(&s, &vote("p4", "p1", 4)).unwrap();

        // p1 and p2 both hold two votes; p1 sits earlier.
        assert_eq!(applied.eliminated, vec![pid("p1")]);
    }

    #[test]
    fn test_two_survivors_vote_ends_game() {
        let s = session(&["p1", "p2"]);
        let s = TwoTruths.apply(&s, &vote("p1", "p2", 1)).unwrap().session;
        let applied = TwoTruths.apply(&s, &vote("p2", "p1", 2)).unwrap();

        // One vote each; p1 is eliminated on seat order, p2 wins.
        assert_eq!(applied.eliminated, vec![pid("p1")]);
        assert_eq!(applied.outcome, Outcome::Winner { player_id: pid("p2") });
    }

    #[test]
    fn test_eliminated_target_rejected_next_round() {
        let s = session(&["p1", "p2", "p3"]);
        let s = TwoTruths.apply(&s, &vote("p1", "p3", 1)).unwrap().session;
        let s = TwoTruths.apply(&s, &vote("p2", "p3", 2)).unwrap().session;
        let s = TwoTruths.apply(&s, &vote("p3", "p1", 3)).unwrap().session;

        let err = TwoTruths.apply(&s, &vote("p1", "p3", 4)).unwrap_err();
        assert!(matches!(err, RuleViolation::WrongMove(_)));
    }
}
