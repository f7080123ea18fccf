//! Results reported back to the host

use std::fmt;
use tokio::task::JoinHandle;
use tracing::warn;

use super::events::LifecycleEvent;
use crate::mode::CanonicalMode;
use crate::navigation::NavigationRequest;

/// What happened to a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationStatus {
    /// The preferred mode now opens first
    Applied(CanonicalMode),
    /// Nothing stored for this entry point
    NoPreference,
    /// A preference exists but the entry point does not offer that mode
    NotOffered(CanonicalMode),
    /// The request targets one record or already fixed its mode
    Bypassed,
    /// Another cycle for the same entry point was in flight
    Skipped,
    /// A newer navigation started before resolution finished
    Superseded,
    /// The session already ended
    SessionClosed,
}

impl fmt::Display for NavigationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationStatus::Applied(mode) => write!(f, "applied '{}'", mode),
            NavigationStatus::NoPreference => write!(f, "no preference"),
            NavigationStatus::NotOffered(mode) => write!(f, "'{}' not offered", mode),
            NavigationStatus::Bypassed => write!(f, "bypassed"),
            NavigationStatus::Skipped => write!(f, "skipped"),
            NavigationStatus::Superseded => write!(f, "superseded"),
            NavigationStatus::SessionClosed => write!(f, "session closed"),
        }
    }
}

/// The request to hand to the host, with what the engine did to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    pub event: LifecycleEvent,
    pub request: NavigationRequest,
    pub status: NavigationStatus,
}

impl NavigationOutcome {
    pub fn new(event: LifecycleEvent, request: NavigationRequest, status: NavigationStatus) -> Self {
        Self {
            event,
            request,
            status,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.status, NavigationStatus::Applied(_))
    }

    pub fn into_request(self) -> NavigationRequest {
        self.request
    }
}

/// Result of persisting one mode switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The store answered but refused the write
    Declined,
    Failed(String),
    /// Another cycle for the same entry point held the key
    Skipped,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

/// Handle on a background save. Dropping it does not cancel the save.
#[derive(Debug)]
pub struct SaveHandle {
    handle: JoinHandle<SaveOutcome>,
}

impl SaveHandle {
    pub(crate) fn new(handle: JoinHandle<SaveOutcome>) -> Self {
        Self { handle }
    }

    pub async fn outcome(self) -> SaveOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Preference save task did not complete: {}", e);
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Summary of session teardown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Background saves all finished within the grace period
    pub drained: bool,
    /// Unsaved switches persisted by the final attempt
    pub flushed: usize,
    /// Unsaved switches the final attempt could not persist
    pub abandoned: usize,
    /// Local cache entries removed
    pub cleared: usize,
}
