//! Room lifecycle for Partyroom: one actor per room, a registry of join
//! codes, and the broadcast fan-out that keeps every client in step.
//!
//! # Architecture
//!
//! - [`RoomRegistry`] mints join codes and spawns one [`RoomHandle`]
//!   per room.
//! - Each room is a Tokio task owning its roster, phase machine,
//!   sequencer, countdown, and game session. Commands arrive on a
//!   bounded channel; ordered [`EventEnvelope`]s leave through the
//!   [`BroadcastHub`].
//! - [`GameTypeStore`] is the persistence seam; [`MemoryStore`] is the
//!   in-process default.
//!
//! [`EventEnvelope`]: partyroom_protocol::EventEnvelope

mod broadcast;
mod config;
mod error;
mod registry;
mod room;
mod store;

pub use broadcast::{BroadcastHub, PlayerSender};
pub use config::{RegistryConfig, RoomConfig};
pub use error::{RegistryError, RoomError, StoreError};
pub(crate) use error::roster_reject;
pub use registry::RoomRegistry;
pub use room::{RoomHandle, RoomInfo};
pub use store::{GameTypeStore, MemoryStore};
