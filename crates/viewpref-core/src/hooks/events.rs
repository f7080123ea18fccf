//! Host events the engine reacts to

use serde::{Deserialize, Serialize};
use std::fmt;

/// Events observed from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// An entry point is about to be shown
    EntryPointLoaded,
    /// The user picked an entry in the navigation menu
    MenuItemSelected,
    /// The user clicked the mode switcher
    ModeSwitched,
    /// The host asked to remember whatever view is active
    CurrentModeRemembered,
    /// The user logged out or the session was torn down
    SessionEnded,
}

impl LifecycleEvent {
    /// Get a human-readable description of this event
    pub fn description(&self) -> &'static str {
        match self {
            LifecycleEvent::EntryPointLoaded => "Entry point loaded",
            LifecycleEvent::MenuItemSelected => "Menu item selected",
            LifecycleEvent::ModeSwitched => "Mode switcher clicked",
            LifecycleEvent::CurrentModeRemembered => "Current mode remembered",
            LifecycleEvent::SessionEnded => "Session ended",
        }
    }

    /// Whether handling this event writes a preference
    pub fn saves(&self) -> bool {
        matches!(
            self,
            LifecycleEvent::ModeSwitched | LifecycleEvent::CurrentModeRemembered
        )
    }

    /// Returns all lifecycle events
    pub fn all() -> &'static [LifecycleEvent] {
        &[
            LifecycleEvent::EntryPointLoaded,
            LifecycleEvent::MenuItemSelected,
            LifecycleEvent::ModeSwitched,
            LifecycleEvent::CurrentModeRemembered,
            LifecycleEvent::SessionEnded,
        ]
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleEvent::EntryPointLoaded => write!(f, "EntryPointLoaded"),
            LifecycleEvent::MenuItemSelected => write!(f, "MenuItemSelected"),
            LifecycleEvent::ModeSwitched => write!(f, "ModeSwitched"),
            LifecycleEvent::CurrentModeRemembered => write!(f, "CurrentModeRemembered"),
            LifecycleEvent::SessionEnded => write!(f, "SessionEnded"),
        }
    }
}

/// How the host reached an entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationOrigin {
    EntryPoint,
    Menu,
}

impl From<NavigationOrigin> for LifecycleEvent {
    fn from(origin: NavigationOrigin) -> Self {
        match origin {
            NavigationOrigin::EntryPoint => LifecycleEvent::EntryPointLoaded,
            NavigationOrigin::Menu => LifecycleEvent::MenuItemSelected,
        }
    }
}
