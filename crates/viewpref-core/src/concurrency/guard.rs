//! Per-key in-flight exclusion

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::hooks::LifecycleState;
use crate::types::PreferenceKey;

/// Tracks which preference keys have a cycle in flight, and in which state
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    in_flight: Arc<DashMap<PreferenceKey, LifecycleState>>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or `None` if a cycle for it is already running.
    ///
    /// The claim is released when the returned [`InFlight`] is dropped.
    pub fn try_enter(&self, key: &PreferenceKey, state: LifecycleState) -> Option<InFlight> {
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(existing) => {
                debug!(
                    "Dropping {} request for {}: already {}",
                    state,
                    key,
                    existing.get()
                );
                None
            }
            Entry::Vacant(slot) => {
                slot.insert(state);
                debug!("{} -> {}", key, state);
                Some(InFlight {
                    in_flight: Arc::clone(&self.in_flight),
                    key: key.clone(),
                })
            }
        }
    }

    /// Run `task` while holding `key`; skipped (`None`) when the key is busy
    pub async fn with_guard<F, T>(&self, key: &PreferenceKey, state: LifecycleState, task: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let _claim = self.try_enter(key, state)?;
        Some(task.await)
    }

    pub fn is_in_flight(&self, key: &PreferenceKey) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Current state of `key`; `Idle` when nothing is in flight
    pub fn state(&self, key: &PreferenceKey) -> LifecycleState {
        self.in_flight
            .get(key)
            .map(|s| *s)
            .unwrap_or(LifecycleState::Idle)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

/// A held claim on one preference key
#[derive(Debug)]
pub struct InFlight {
    in_flight: Arc<DashMap<PreferenceKey, LifecycleState>>,
    key: PreferenceKey,
}

impl InFlight {
    pub fn key(&self) -> &PreferenceKey {
        &self.key
    }

    pub fn transition(&self, state: LifecycleState) {
        if let Some(mut current) = self.in_flight.get_mut(&self.key) {
            debug!("{} {} -> {}", self.key, *current, state);
            *current = state;
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
        debug!("{} -> {}", self.key, LifecycleState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn key() -> PreferenceKey {
        PreferenceKey::new("7", "crm.lead", Some("42"))
    }

    #[test]
    fn test_second_claim_refused() {
        let guard = ReentrancyGuard::new();
        let first = guard.try_enter(&key(), LifecycleState::Resolving);
        assert!(first.is_some());
        assert!(guard.try_enter(&key(), LifecycleState::Saving).is_none());
        assert_eq!(guard.state(&key()), LifecycleState::Resolving);

        drop(first);
        assert!(!guard.is_in_flight(&key()));
        assert_eq!(guard.state(&key()), LifecycleState::Idle);
        assert!(guard.try_enter(&key(), LifecycleState::Saving).is_some());
    }

    #[test]
    fn test_distinct_keys_independent() {
        let guard = ReentrancyGuard::new();
        let other = PreferenceKey::new("7", "crm.lead", Some("43"));
        let _a = guard.try_enter(&key(), LifecycleState::Resolving).unwrap();
        let _b = guard.try_enter(&other, LifecycleState::Resolving).unwrap();
        assert_eq!(guard.in_flight_count(), 2);
    }

    #[test]
    fn test_transition_updates_state() {
        let guard = ReentrancyGuard::new();
        let claim = guard.try_enter(&key(), LifecycleState::Resolving).unwrap();
        claim.transition(LifecycleState::Overriding);
        assert_eq!(guard.state(&key()), LifecycleState::Overriding);
    }

    #[tokio::test]
    async fn test_concurrent_with_guard_runs_once() {
        let guard = ReentrancyGuard::new();
        let slow_key = key();
        let fast_key = key();
        let slow = guard.with_guard(&slow_key, LifecycleState::Resolving, async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            "first"
        });
        let fast = guard.with_guard(&fast_key, LifecycleState::Resolving, async { "second" });

        let (a, b) = tokio::join!(slow, fast);
        assert_eq!(a, Some("first"));
        assert_eq!(b, None);
        assert_eq!(guard.in_flight_count(), 0);
    }
}
