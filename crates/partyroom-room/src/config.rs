//! Room and registry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a single room instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Minimum connected players required to start the game.
    pub min_players: usize,

    /// Maximum players allowed in the room.
    pub max_players: usize,

    /// Fixed length of the start countdown.
    pub countdown: Duration,

    /// How long a disconnected player's lobby seat is held before it
    /// is released. Seats in a running game are held until the room
    /// closes.
    pub reconnect_grace: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 8,
            countdown: Duration::from_secs(5),
            reconnect_grace: Duration::from_secs(30),
        }
    }
}

/// Configuration for the room registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Join-code length. Four characters gives ~900k codes from the
    /// confusion-free alphabet, plenty for concurrently open rooms.
    pub code_length: usize,

    /// How many random codes to try before giving up on creation.
    pub max_code_attempts: usize,

    /// How long an empty room lingers before the sweeper closes it.
    pub idle_timeout: Duration,

    /// Command channel size per room actor (backpressure bound).
    pub channel_size: usize,

    /// Per-room settings applied to every room this registry creates.
    pub room: RoomConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            code_length: 4,
            max_code_attempts: 32,
            idle_timeout: Duration::from_secs(300),
            channel_size: 64,
            room: RoomConfig::default(),
        }
    }
}
