//! "Latest request wins" sequencing for callers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generation number handed out by [`RequestSequencer::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Discards results of renders superseded by a newer request.
///
/// ```
/// use twinmark_render::RequestSequencer;
///
/// let sequencer = RequestSequencer::new();
/// let first = sequencer.begin();
/// let second = sequencer.begin();
///
/// assert_eq!(sequencer.accept(first, "stale"), None);
/// assert_eq!(sequencer.accept(second, "fresh"), Some("fresh"));
/// ```
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding every earlier ticket.
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no request started after `ticket`.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Pass `value` through if `ticket` is still current.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(ticket = ticket.0, "Dropped superseded render result");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_latest_ticket_is_current() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.begin();
        assert!(sequencer.is_current(first));
        let second = sequencer.begin();
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_slow_render_discarded() {
        let sequencer = Arc::new(RequestSequencer::new());
        let slow = sequencer.begin();
        let fast = sequencer.begin();

        assert_eq!(sequencer.accept(fast, 2), Some(2));
        let handle = {
            let sequencer = Arc::clone(&sequencer);
            tokio::spawn(async move { sequencer.accept(slow, 1) })
        };
        assert_eq!(handle.await.ok().flatten(), None);
    }
}
