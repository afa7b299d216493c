use crate::state::Context;
use std::collections::HashMap;
use tracing::debug;

/// Render targets whose refreshes may race each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Avatars,
    Projects,
    Tags,
    History,
    Jobs,
    Voices(Context),
    ConfigStatus,
    Preview,
    Estimate(Context),
}

/// Issued with a read, presented again with its response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub target: Target,
    pub seq: u64,
}

/// Per-target monotonically increasing request numbers.
///
/// A response is applied only if it is newer than the last one applied to the
/// same target, so a slow early reply never overwrites a fast later one.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: HashMap<Target, u64>,
    applied: HashMap<Target, u64>,
}

impl RequestSequencer {
    pub fn issue(&mut self, target: Target) -> Ticket {
        let seq = self.issued.entry(target).or_insert(0);
        *seq += 1;
        Ticket { target, seq: *seq }
    }

    /// Whether the response carrying `ticket` may be applied; records it if so
    pub fn accept(&mut self, ticket: Ticket) -> bool {
        let last = self.applied.entry(ticket.target).or_insert(0);
        if ticket.seq <= *last {
            debug!(target = ?ticket.target, seq = ticket.seq, last = *last, "Discarding stale response");
            return false;
        }
        *last = ticket.seq;
        true
    }
}
