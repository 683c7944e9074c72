//! Per-room fan-out of event envelopes to subscribed players.
//!
//! The hub is owned by the room actor and mutated only from its task.
//! Senders are unbounded: the actor must never block on a slow client,
//! and a client that stops draining is detected as a failed send when
//! its receiver drops.

use std::collections::HashMap;

use partyroom_protocol::{EventEnvelope, PlayerId};
use tokio::sync::mpsc;
use tracing::debug;

/// Channel sender delivering envelopes to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<EventEnvelope>;

/// Fan-out table from player id to their outbound channel.
#[derive(Debug, Default)]
pub struct BroadcastHub {
    senders: HashMap<PlayerId, PlayerSender>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces, on reconnect) a player's outbound channel.
    pub fn subscribe(&mut self, player_id: PlayerId, sender: PlayerSender) {
        self.senders.insert(player_id, sender);
    }

    pub fn unsubscribe(&mut self, player_id: &PlayerId) {
        self.senders.remove(player_id);
    }

    pub fn is_subscribed(&self, player_id: &PlayerId) -> bool {
        self.senders.contains_key(player_id)
    }

    /// Sends the envelope to every subscriber, in subscription-table
    /// order. Returns the players whose channel is gone so the caller
    /// can mark them disconnected; their entries are dropped here.
    pub fn broadcast(&mut self, envelope: &EventEnvelope) -> Vec<PlayerId> {
        let mut failed = Vec::new();
        for (player_id, sender) in &self.senders {
            if sender.send(envelope.clone()).is_err() {
                failed.push(player_id.clone());
            }
        }
        for player_id in &failed {
            debug!(%player_id, "subscriber channel closed, dropping");
            self.senders.remove(player_id);
        }
        failed
    }

    /// Sends the envelope to a single player. Returns `false` if the
    /// player is not subscribed or their channel is gone.
    pub fn send_to(&mut self, player_id: &PlayerId, envelope: EventEnvelope) -> bool {
        match self.senders.get(player_id) {
            Some(sender) => {
                if sender.send(envelope).is_err() {
                    self.senders.remove(player_id);
                    return false;
                }
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.senders.len()
    }
}
