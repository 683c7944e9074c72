//! Wire protocol for Partyroom.
//!
//! This crate defines the language spoken across the engine boundary:
//!
//! - **Identity & lifecycle** ([`PlayerId`], [`RoomCode`], [`GameType`],
//!   [`Phase`], [`Outcome`]) — the facts both sides agree on.
//! - **Actions** ([`Action`], [`ActionKind`], [`GameMove`]) — what
//!   players send in, stamped with a total order on arrival.
//! - **Events** ([`EventEnvelope`], [`ServerEvent`]) — the ordered state
//!   deltas fanned out to every room member.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — bytes at the outermost edge.
//!
//! The protocol layer knows nothing about rooms, rosters, or rules — it
//! only defines shapes and their serialized forms.

mod action;
mod codec;
mod error;
mod event;
mod types;

pub use action::{Action, ActionKind, GameMove};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::{EventEnvelope, PlayerSnapshot, ServerEvent};
pub use types::{GameType, Outcome, Phase, PlayerId, RejectReason, RoomCode};
