//! Per-widget request sequencing.
//!
//! Requests are never cancelled. Instead every request carries a [`Ticket`]
//! and a response is applied only if its ticket is the most recent one its
//! widget issued, so a slow stale response can never overwrite fresher state.

use serde::{Deserialize, Serialize};

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    issued: u64,
    settled: Option<u64>,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket. Every earlier ticket becomes stale.
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued && self.settled != Some(ticket.0)
    }

    /// Mark `ticket` as answered. Returns `false` (and changes nothing) for
    /// stale or already-settled tickets.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.settled = Some(ticket.0);
        true
    }

    /// A request is outstanding when the latest ticket has not been settled.
    pub fn in_flight(&self) -> bool {
        self.issued > 0 && self.settled != Some(self.issued)
    }
}
