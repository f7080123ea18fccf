//! Remembers and re-applies the last used view mode per user and entry point
//!
//! Facade over the workspace crates:
//! - `viewpref-core`: the engine, its cache, resolver, overrider and configuration
//! - `viewpref-store`: preference store backends and admin operations

pub use viewpref_core::{
    EngineBuilder, ModeSwitch, NavigationHooks, NavigationOrigin, NavigationRequest, PrefError,
    PrefResult, ViewPreferenceEngine,
};
pub use viewpref_store::{FilePreferenceStore, MemoryPreferenceStore, UserPreferenceService};
