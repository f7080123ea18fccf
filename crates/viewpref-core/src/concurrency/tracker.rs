//! Keep-only-the-latest tracking of navigations

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Identifies one admitted navigation
#[derive(Debug, Clone)]
pub struct NavigationTicket {
    generation: u64,
    token: CancellationToken,
}

impl NavigationTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolves once a newer navigation starts or the session ends
    pub async fn superseded(&self) {
        self.token.cancelled().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Hands out tickets; starting a navigation cancels the one before it
#[derive(Debug)]
pub struct NavigationTracker {
    root: CancellationToken,
    generation: AtomicU64,
    current: Mutex<CancellationToken>,
}

impl Default for NavigationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationTracker {
    pub fn new() -> Self {
        let root = CancellationToken::new();
        let current = root.child_token();
        Self {
            root,
            generation: AtomicU64::new(0),
            current: Mutex::new(current),
        }
    }

    /// Start a navigation, superseding whichever one is running
    pub fn begin(&self) -> NavigationTicket {
        let token = self.root.child_token();
        let mut current = self.current.lock();
        current.cancel();
        *current = token.clone();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Navigation #{} started", generation);
        NavigationTicket { generation, token }
    }

    /// Whether `ticket` still belongs to the most recent navigation
    pub fn is_current(&self, ticket: &NavigationTicket) -> bool {
        !ticket.token.is_cancelled() && self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Cancel every navigation, present and future
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let tracker = NavigationTracker::new();
        let first = tracker.begin();
        assert!(tracker.is_current(&first));

        let second = tracker.begin();
        assert!(!tracker.is_current(&first));
        assert!(first.is_cancelled());
        assert!(tracker.is_current(&second));
        assert_eq!(second.generation(), first.generation() + 1);
    }

    #[test]
    fn test_shutdown_cancels_everything() {
        let tracker = NavigationTracker::new();
        let ticket = tracker.begin();
        assert!(!tracker.is_shut_down());
        tracker.shutdown();
        assert!(tracker.is_shut_down());
        assert!(!tracker.is_current(&ticket));
        assert!(tracker.begin().is_cancelled());
    }

    #[tokio::test]
    async fn test_superseded_wakes_waiter() {
        let tracker = NavigationTracker::new();
        let first = tracker.begin();

        let waiter = async {
            tokio::select! {
                _ = first.superseded() => true,
                _ = tokio::time::sleep(Duration::from_secs(5)) => false,
            }
        };
        let (woken, _second) = tokio::join!(waiter, async { tracker.begin() });
        assert!(woken);
    }

    #[test]
    fn test_superseded_is_pending_until_next_begin() {
        let tracker = NavigationTracker::new();
        let ticket = tracker.begin();

        let mut waiter = tokio_test::task::spawn(ticket.superseded());
        tokio_test::assert_pending!(waiter.poll());

        let _next = tracker.begin();
        assert!(waiter.is_woken());
        tokio_test::assert_ready!(waiter.poll());
    }
}
