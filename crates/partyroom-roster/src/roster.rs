//! The per-room roster: join order, ready gate, presence, host tenure.
//!
//! # Concurrency note
//!
//! `Roster` is NOT thread-safe by itself — it is owned by a single room
//! actor and mutated only from that actor's task. Keeping it a plain
//! `Vec` avoids hidden locking and preserves join order, which doubles
//! as the host-promotion tenure order.

use std::time::Duration;

use partyroom_protocol::{PlayerId, PlayerSnapshot};
use tokio::time::Instant;
use tracing::info;

use crate::{Player, Presence, RosterError};

/// Result of a disconnect, so the controller knows whether the host
/// moved and to whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// The departing player held the host flag.
    pub was_host: bool,
    /// The longest-tenured connected player promoted in their place,
    /// if any remained.
    pub promoted: Option<PlayerId>,
}

/// The set of players in one room, in join order.
#[derive(Debug)]
pub struct Roster {
    players: Vec<Player>,
    max_players: usize,
}

impl Roster {
    pub fn new(max_players: usize) -> Self {
        Self {
            players: Vec::new(),
            max_players,
        }
    }

    /// Adds a player. The first joiner becomes host.
    ///
    /// Phase gating (`RoomNotJoinable`) lives in the session controller;
    /// the roster only enforces capacity and uniqueness.
    ///
    /// # Errors
    /// - [`RosterError::AlreadyJoined`] if the id is present.
    /// - [`RosterError::RoomFull`] at the cap.
    pub fn join(
        &mut self,
        id: PlayerId,
        nickname: impl Into<String>,
    ) -> Result<&Player, RosterError> {
        if self.get(&id).is_some() {
            return Err(RosterError::AlreadyJoined(id));
        }
        if self.players.len() >= self.max_players {
            return Err(RosterError::RoomFull(self.max_players));
        }

        let is_host = self.players.is_empty();
        let player = Player::new(id.clone(), nickname.into(), is_host);
        self.players.push(player);
        info!(player_id = %id, is_host, players = self.players.len(), "player joined");

        // Just pushed, so the entry exists.
        Ok(self.players.last().expect("just inserted"))
    }

    /// Sets the ready flag. The controller makes this a no-op outside
    /// Lobby; here it is unconditional.
    pub fn set_ready(
        &mut self,
        id: &PlayerId,
        ready: bool,
    ) -> Result<(), RosterError> {
        let player = self.get_mut(id)?;
        player.is_ready = ready;
        Ok(())
    }

    /// Marks a player disconnected and, if they were host, promotes the
    /// longest-tenured remaining connected player.
    ///
    /// Game bookkeeping (eliminations, turn order) is deliberately left
    /// untouched — a returning player must find their state intact.
    pub fn mark_disconnected(
        &mut self,
        id: &PlayerId,
    ) -> Result<Departure, RosterError> {
        let player = self.get_mut(id)?;
        if !player.presence.is_connected() {
            return Err(RosterError::PresenceUnchanged(id.clone()));
        }
        let now = Instant::now();
        player.presence = Presence::Disconnected { since: now };
        player.last_seen = now;
        let was_host = player.is_host;
        player.is_host = false;

        let mut promoted = None;
        if was_host {
            // Tenure order == join order: promote the first still
            // connected entry.
            if let Some(candidate) = self
                .players
                .iter_mut()
                .find(|p| p.presence.is_connected())
            {
                candidate.is_host = true;
                promoted = Some(candidate.id.clone());
            }
        }

        if let Some(new_host) = &promoted {
            info!(player_id = %id, %new_host, "host disconnected, promoted replacement");
        } else {
            info!(player_id = %id, was_host, "player disconnected");
        }

        Ok(Departure { was_host, promoted })
    }

    /// Marks a player reconnected. If the room was left hostless (every
    /// player had disconnected), the returning player takes the host
    /// flag so the one-host invariant holds again.
    pub fn mark_reconnected(&mut self, id: &PlayerId) -> Result<(), RosterError> {
        let hostless = !self.players.iter().any(|p| p.is_host);
        let player = self.get_mut(id)?;
        if player.presence.is_connected() {
            return Err(RosterError::PresenceUnchanged(id.clone()));
        }
        player.presence = Presence::Connected;
        player.last_seen = Instant::now();
        if hostless {
            player.is_host = true;
        }
        info!(player_id = %id, reclaimed_host = hostless, "player reconnected");
        Ok(())
    }

    /// The ready gate: `true` iff every *connected* non-host player is
    /// ready. Disconnected players don't block the gate; the host's own
    /// flag is ignored.
    pub fn all_ready(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.presence.is_connected() && !p.is_host)
            .all(|p| p.is_ready)
    }

    /// Releases a seat entirely. Disconnecting already moved the host
    /// flag off the player, so no promotion happens here.
    ///
    /// # Errors
    /// [`RosterError::UnknownPlayer`] if the id is not seated.
    pub fn remove(&mut self, id: &PlayerId) -> Result<Player, RosterError> {
        let index = self
            .players
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| RosterError::UnknownPlayer(id.clone()))?;
        let player = self.players.remove(index);
        info!(player_id = %id, players = self.players.len(), "seat released");
        Ok(player)
    }

    /// Ids of disconnected players whose reconnect grace has lapsed.
    pub fn expired_ids(&self, grace: Duration) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter_map(|p| match p.presence {
                Presence::Disconnected { since } if since.elapsed() >= grace => {
                    Some(p.id.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// The earliest instant at which a held seat lapses, if any seat is
    /// currently held for a disconnected player.
    pub fn next_expiry(&self, grace: Duration) -> Option<Instant> {
        self.players
            .iter()
            .filter_map(|p| match p.presence {
                Presence::Disconnected { since } => Some(since + grace),
                Presence::Connected => None,
            })
            .min()
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    fn get_mut(&mut self, id: &PlayerId) -> Result<&mut Player, RosterError> {
        self.players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| RosterError::UnknownPlayer(id.clone()))
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_connected(&self, id: &PlayerId) -> bool {
        self.get(id).is_some_and(|p| p.presence.is_connected())
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn is_host(&self, id: &PlayerId) -> bool {
        self.get(id).is_some_and(|p| p.is_host)
    }

    /// All players in join order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Ids of connected players in join order (the seat order a game
    /// session starts with).
    pub fn connected_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.presence.is_connected())
            .map(|p| p.id.clone())
            .collect()
    }

    pub fn connected_count(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.presence.is_connected())
            .count()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// The wire-format roster view broadcast on every change.
    pub fn snapshot(&self) -> Vec<PlayerSnapshot> {
        self.players.iter().map(Player::snapshot).collect()
    }
}

// =========================================================================
// Tests
// =========================================================================
