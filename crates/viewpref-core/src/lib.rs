//! Viewpref Core Library
//!
//! Remembers the presentation mode (list, kanban, form, ...) a user last
//! opened an entry point with, and re-applies it the next time the host
//! navigates there. Resolution goes through a session scoped local cache in
//! front of a durable preference store; saves happen in the background.

pub mod cache;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod hooks;
pub mod mode;
pub mod navigation;
pub mod resolver;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheEntry, CacheStatistics, LocalCache, MemorySessionStorage, SessionStorage};
pub use concurrency::{ActiveView, HostReadiness, NavigationTracker, ReentrancyGuard};
pub use config::{Config, ConfigLoader, EngineConfig, LogFormat};
pub use error::{PrefError, PrefResult, UnifiedError};
pub use hooks::{
    EngineBuilder, LifecycleEvent, LifecycleState, ModeSwitch, NavigationHooks, NavigationOrigin,
    NavigationOutcome, NavigationStatus, SaveHandle, SaveOutcome, SessionReport,
    ViewPreferenceEngine,
};
pub use mode::{CanonicalMode, ModeNormalizer};
pub use navigation::{ModeDescriptor, NavigationRequest, Overrider};
pub use resolver::{Resolution, ResolutionSource, Resolver};
pub use store::PreferenceStore;
pub use types::{Preference, PreferenceKey, UserId};
