//! Game rule engine for Partyroom.
//!
//! Rules are pure: a [`GameRules`] variant judges one action against a
//! [`GameSession`] and returns the replacement state. All clocks,
//! channels, and sequencing live in the room layer; this crate can be
//! tested by replaying plain action logs.
//!
//! # Variants
//!
//! - [`Nunchi`] — race to claim counts, silence eliminates
//! - [`ThreeSixNine`] — count in turn, clap on 3/6/9 digits
//! - [`TwoTruths`] — vote out the liar each round
//! - [`BaskinRobbins31`] — count to 31, saying it loses

mod baskin_robbins;
mod nunchi;
mod registry;
mod rules;
mod session;
mod three_six_nine;
mod two_truths;

pub use baskin_robbins::BaskinRobbins31;
pub use nunchi::Nunchi;
pub use registry::GameRegistry;
pub use rules::{Applied, GameRules, RuleViolation};
pub use session::{Ballot, GameSession};
pub use three_six_nine::ThreeSixNine;
pub use two_truths::TwoTruths;
