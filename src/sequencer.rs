use std::sync::atomic::{AtomicU64, Ordering};

/// Dispatch order of one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn number(&self) -> u64 {
        self.0
    }
}

/// Lets only the newest response win when requests overlap.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets start at 1 and strictly increase.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if no later ticket has been applied yet; records this one.
    pub fn try_apply(&self, ticket: Ticket) -> bool {
        self.applied.fetch_max(ticket.0, Ordering::SeqCst) < ticket.0
    }
}

#[cfg(test)]
impl RequestSequencer {
    pub(crate) fn latest_applied(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }
}
