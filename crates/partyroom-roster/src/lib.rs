//! Player roster for Partyroom rooms.
//!
//! Tracks who is in a room, their ready flag, their presence, and which
//! player holds the host flag. The roster is owned by a single room
//! actor; join order doubles as host-promotion tenure.
//!
//! # Key types
//!
//! - [`Roster`] — the per-room player set and ready gate
//! - [`Player`] / [`Presence`] — one entry and its connection state
//! - [`Departure`] — what a disconnect did to the host flag

mod error;
mod player;
mod roster;

pub use error::RosterError;
pub use player::{Player, Presence};
pub use roster::{Departure, Roster};
