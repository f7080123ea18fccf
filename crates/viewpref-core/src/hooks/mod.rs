//! Lifecycle hooks: the seams where the host calls into the engine
//!
//! The host owns routing and rendering. It calls [`NavigationHooks`] before
//! opening an entry point and after the user switches modes; the engine
//! rewrites requests and persists preferences behind those calls.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use viewpref_core::hooks::{EngineBuilder, ModeSwitch};
//! use viewpref_core::mode::ModeNormalizer;
//! use viewpref_core::navigation::NavigationRequest;
//! # use async_trait::async_trait;
//! # use viewpref_core::error::PrefResult;
//! # use viewpref_core::store::PreferenceStore;
//! # use viewpref_core::types::{Preference, PreferenceKey};
//! # struct NullStore;
//! # #[async_trait]
//! # impl PreferenceStore for NullStore {
//! #     async fn get(&self, _key: &PreferenceKey) -> PrefResult<Option<Preference>> { Ok(None) }
//! #     async fn save(&self, _preference: &Preference) -> PrefResult<bool> { Ok(true) }
//! # }
//!
//! # #[tokio::main]
//! # async fn main() -> PrefResult<()> {
//! let engine = EngineBuilder::new("7", Arc::new(NullStore)).build()?;
//!
//! // The user switches the lead pipeline to the list view
//! let save = engine
//!     .on_mode_switch(ModeSwitch::new("crm.lead", Some("42"), "tree"))
//!     .expect("session is open");
//! assert!(save.outcome().await.is_saved());
//!
//! // Next time the pipeline opens, list comes first
//! let request = NavigationRequest::new("crm.lead", Some("42"))
//!     .with_modes(["kanban", "list", "form"], &ModeNormalizer::default());
//! let outcome = engine.on_entry_point_load(request).await;
//! assert_eq!(outcome.request.view_mode(), "list,form,kanban");
//!
//! engine.end_session().await;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod events;
pub mod outcome;
pub mod state;

pub use engine::{EngineBuilder, ModeSwitch, NavigationHooks, ViewPreferenceEngine};
pub use events::{LifecycleEvent, NavigationOrigin};
pub use outcome::{NavigationOutcome, NavigationStatus, SaveHandle, SaveOutcome, SessionReport};
pub use state::LifecycleState;
