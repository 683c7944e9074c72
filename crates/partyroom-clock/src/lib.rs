//! Sequencing and scheduling primitives for Partyroom room actors.
//!
//! Two small pieces live here:
//!
//! - [`Sequencer`] — assigns a strictly increasing sequence number and a
//!   server timestamp to everything a room processes or emits. This is
//!   the single total order the session controller and the game rules
//!   rely on; nothing downstream may reorder relative to it.
//! - [`Countdown`] — a one-shot, server-scheduled timer. While unarmed,
//!   [`Countdown::elapsed`] pends forever, which makes it safe to sit in
//!   a `tokio::select!` branch of the room actor's loop. Once armed it
//!   cannot be cancelled by any player action — the deadline fires or
//!   the actor is dropped.
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         cmd = receiver.recv() => { /* stamp with sequencer, handle */ }
//!         _ = countdown.elapsed() => { /* Countdown → Playing */ }
//!     }
//! }
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::{self, Instant as TokioInstant};
use tracing::debug;

/// Milliseconds since the unix epoch.
///
/// Wall-clock time is only used for the shared countdown epoch and for
/// timestamps clients may display; all internal scheduling uses the
/// monotonic clock.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// A stamp assigned to one inbound action or outbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    /// Strictly increasing per room, starting at 1.
    pub sequence: u64,
    /// Server wall-clock time at stamping, unix millis.
    pub timestamp_ms: u64,
}

/// Assigns the per-room total order.
///
/// One `Sequencer` is owned by each room actor; because the actor
/// serializes all mutations, no synchronization is needed here.
#[derive(Debug, Default)]
pub struct Sequencer {
    last: u64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self { last: 0 }
    }

    /// Assigns the next sequence number and a server timestamp.
    pub fn stamp(&mut self) -> Stamp {
        self.last += 1;
        Stamp {
            sequence: self.last,
            timestamp_ms: now_ms(),
        }
    }

    /// The most recently assigned sequence number (0 before any stamp).
    pub fn last(&self) -> u64 {
        self.last
    }
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// The data a `CountdownStarted` broadcast carries: the shared epoch
/// every client computes remaining time from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownEpoch {
    /// Server wall-clock time the countdown began, unix millis.
    pub epoch_ms: u64,
    /// Fixed countdown duration in milliseconds.
    pub duration_ms: u64,
}

/// A one-shot server-scheduled timer driving the Countdown → Playing
/// transition.
///
/// The transition is never driven by a client: the actor arms the timer
/// once, broadcasts the epoch, and the deadline resolves exactly
/// `duration` later regardless of what any client does.
#[derive(Debug, Default)]
pub struct Countdown {
    deadline: Option<TokioInstant>,
}

impl Countdown {
    pub fn new() -> Self {
        Self { deadline: None }
    }

    /// Arms the timer and returns the shared epoch for broadcasting.
    ///
    /// Arming an already armed countdown is a logic error upstream; the
    /// existing deadline is kept and the new epoch reflects it not at
    /// all, so the controller gates `StartGame` on phase instead.
    pub fn arm(&mut self, duration: Duration) -> CountdownEpoch {
        if self.deadline.is_none() {
            self.deadline = Some(TokioInstant::now() + duration);
            debug!(duration_ms = duration.as_millis() as u64, "countdown armed");
        }
        CountdownEpoch {
            epoch_ms: now_ms(),
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Whether a deadline is currently scheduled.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves once the armed deadline passes, then disarms.
    ///
    /// While unarmed this future pends forever — `tokio::select!` will
    /// simply service its other branches. Cancel-safe: if another branch
    /// wins the race, the deadline stays scheduled for the next poll.
    pub async fn elapsed(&mut self) {
        let Some(deadline) = self.deadline else {
            std::future::pending::<()>().await;
            unreachable!()
        };
        time::sleep_until(deadline).await;
        self.deadline = None;
        debug!("countdown elapsed");
    }
}

// =========================================================================
// Tests
// =========================================================================
