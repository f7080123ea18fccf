//! Per-key lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a preference key is in its resolve-override-save cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LifecycleState {
    #[default]
    Idle,
    /// Waiting on the cache or the store
    Resolving,
    /// Rewriting the navigation request
    Overriding,
    /// Persisting a mode switch
    Saving,
}

impl LifecycleState {
    pub fn is_busy(&self) -> bool {
        !matches!(self, LifecycleState::Idle)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Idle => write!(f, "Idle"),
            LifecycleState::Resolving => write!(f, "Resolving"),
            LifecycleState::Overriding => write!(f, "Overriding"),
            LifecycleState::Saving => write!(f, "Saving"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_idle_is_not_busy() {
        assert!(!LifecycleState::Idle.is_busy());
        assert!(LifecycleState::Resolving.is_busy());
        assert!(LifecycleState::Overriding.is_busy());
        assert!(LifecycleState::Saving.is_busy());
        assert_eq!(LifecycleState::default(), LifecycleState::Idle);
    }
}
