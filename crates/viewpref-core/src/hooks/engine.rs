//! The view preference engine
//!
//! One engine serves one user session. It resolves preferences when the host
//! opens an entry point, saves them when the user switches modes and flushes
//! whatever is still unsaved when the session ends.

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, info, info_span, instrument, warn};
use uuid::Uuid;

use super::events::{LifecycleEvent, NavigationOrigin};
use super::outcome::{NavigationOutcome, NavigationStatus, SaveHandle, SaveOutcome, SessionReport};
use super::state::LifecycleState;
use crate::cache::{CacheStatistics, LocalCache, MemorySessionStorage, SessionStorage};
use crate::concurrency::{ActiveView, HostReadiness, NavigationTracker, ReentrancyGuard};
use crate::config::{EngineConfig, validate_engine};
use crate::error::PrefResult;
use crate::mode::ModeNormalizer;
use crate::navigation::{NavigationRequest, Overrider};
use crate::resolver::{Resolution, Resolver, bounded};
use crate::store::PreferenceStore;
use crate::types::{Preference, PreferenceKey, UserId};

/// A mode the user switched to, as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSwitch {
    pub model: String,
    pub action_id: Option<String>,
    pub action_name: Option<String>,
    /// Mode as the host names it
    pub mode: String,
}

impl ModeSwitch {
    pub fn new(
        model: impl Into<String>,
        action_id: Option<impl Into<String>>,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            action_id: action_id.map(Into::into),
            action_name: None,
            mode: mode.into(),
        }
    }

    pub fn with_action_name(mut self, name: impl Into<String>) -> Self {
        self.action_name = Some(name.into());
        self
    }
}

impl From<ActiveView> for ModeSwitch {
    fn from(view: ActiveView) -> Self {
        Self {
            model: view.model,
            action_id: view.action_id,
            action_name: view.action_name,
            mode: view.mode,
        }
    }
}

/// Hooks the host calls around navigation
#[async_trait]
pub trait NavigationHooks: Send + Sync {
    /// Called before an entry point opens; returns the request to render
    async fn before_navigate(
        &self,
        origin: NavigationOrigin,
        request: NavigationRequest,
    ) -> NavigationRequest;

    /// Called after the user switched modes. Must return immediately.
    fn after_mode_switch(&self, switch: ModeSwitch);

    /// Called once when the user session ends
    async fn session_ended(&self);
}

/// Builder for [`ViewPreferenceEngine`]
pub struct EngineBuilder {
    user_id: UserId,
    store: Arc<dyn PreferenceStore>,
    session_storage: Option<Arc<dyn SessionStorage>>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new(user_id: impl Into<UserId>, store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            user_id: user_id.into(),
            store,
            session_storage: None,
            config: EngineConfig::default(),
        }
    }

    /// Back the local cache with host provided storage
    pub fn with_session_storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.session_storage = Some(storage);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> PrefResult<ViewPreferenceEngine> {
        validate_engine(&self.config)?;
        let normalizer = ModeNormalizer::with_aliases(&self.config.mode_aliases)?;
        let storage = self
            .session_storage
            .unwrap_or_else(|| Arc::new(MemorySessionStorage::new()));
        let cache = Arc::new(LocalCache::new(
            storage,
            self.config.storage_prefix.clone(),
        ));
        let resolver = Resolver::new(cache.clone(), self.store.clone(), normalizer, &self.config);
        let session_id = Uuid::new_v4().to_string();

        info!(
            "View preference session {} started for user {}",
            session_id, self.user_id
        );

        Ok(ViewPreferenceEngine {
            inner: Arc::new(EngineInner {
                session_id,
                user_id: self.user_id,
                config: self.config,
                cache,
                store: self.store,
                resolver,
                overrider: Overrider::new(),
                guard: ReentrancyGuard::new(),
                navigations: NavigationTracker::new(),
                readiness: HostReadiness::new(),
                saves: TaskTracker::new(),
                pending: Mutex::new(HashMap::new()),
                sequence: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        })
    }
}

/// A mode switch not yet confirmed by the store
#[derive(Debug, Clone)]
struct PendingSave {
    preference: Preference,
    sequence: u64,
}

struct EngineInner {
    session_id: String,
    user_id: UserId,
    config: EngineConfig,
    cache: Arc<LocalCache>,
    store: Arc<dyn PreferenceStore>,
    resolver: Resolver,
    overrider: Overrider,
    guard: ReentrancyGuard,
    navigations: NavigationTracker,
    readiness: HostReadiness,
    saves: TaskTracker,
    pending: Mutex<HashMap<PreferenceKey, PendingSave>>,
    sequence: AtomicU64,
    closed: AtomicBool,
}

/// Remembers the last mode per entry point and re-applies it on navigation.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct ViewPreferenceEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for ViewPreferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewPreferenceEngine")
            .field("session_id", &self.inner.session_id)
            .field("user_id", &self.inner.user_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl ViewPreferenceEngine {
    pub fn builder(user_id: impl Into<UserId>, store: Arc<dyn PreferenceStore>) -> EngineBuilder {
        EngineBuilder::new(user_id, store)
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.inner.user_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn normalizer(&self) -> &ModeNormalizer {
        self.inner.resolver.normalizer()
    }

    /// Signal the host raises once its active view is known
    pub fn readiness(&self) -> &HostReadiness {
        &self.inner.readiness
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Lifecycle state of one entry point
    pub fn state(&self, key: &PreferenceKey) -> LifecycleState {
        self.inner.guard.state(key)
    }

    pub fn cache_statistics(&self) -> CacheStatistics {
        self.inner.cache.statistics()
    }

    /// Mode switches whose save has not succeeded yet
    pub fn pending_saves(&self) -> usize {
        self.inner.pending.lock().len()
    }

    pub fn preference_key(&self, model: &str, action_id: Option<&str>) -> PreferenceKey {
        PreferenceKey::new(self.inner.user_id.clone(), model, action_id)
    }

    /// Resolve a preference without touching any request
    pub async fn lookup(&self, key: &PreferenceKey) -> Option<Resolution> {
        self.inner.resolver.lookup(key).await
    }

    /// The host is about to open an entry point
    pub async fn on_entry_point_load(&self, request: NavigationRequest) -> NavigationOutcome {
        self.navigate(LifecycleEvent::EntryPointLoaded, request).await
    }

    /// The user picked an entry point from the menu
    pub async fn on_menu_selected(&self, request: NavigationRequest) -> NavigationOutcome {
        self.navigate(LifecycleEvent::MenuItemSelected, request).await
    }

    #[instrument(skip(self, request), fields(session = %self.inner.session_id, model = %request.model))]
    async fn navigate(&self, event: LifecycleEvent, request: NavigationRequest) -> NavigationOutcome {
        let inner = &self.inner;
        if self.is_closed() {
            return NavigationOutcome::new(event, request, NavigationStatus::SessionClosed);
        }
        if !request.accepts_override() {
            debug!("Navigation to {} bypasses preferences", request.model);
            return NavigationOutcome::new(event, request, NavigationStatus::Bypassed);
        }

        let key = request.preference_key(&inner.user_id);
        let Some(claim) = inner.guard.try_enter(&key, LifecycleState::Resolving) else {
            debug!("Dropping {} for {}, a cycle is already running", event, key);
            return NavigationOutcome::new(event, request, NavigationStatus::Skipped);
        };
        let ticket = inner.navigations.begin();

        let resolved = tokio::select! {
            biased;
            _ = ticket.superseded() => {
                debug!("Navigation to {} superseded while resolving", key);
                return NavigationOutcome::new(event, request, NavigationStatus::Superseded);
            }
            resolved = inner.resolver.resolve(&key) => resolved,
        };
        if !inner.navigations.is_current(&ticket) {
            return NavigationOutcome::new(event, request, NavigationStatus::Superseded);
        }

        let Some(mode) = resolved else {
            return NavigationOutcome::new(event, request, NavigationStatus::NoPreference);
        };
        claim.transition(LifecycleState::Overriding);
        let offered = request
            .available_modes
            .iter()
            .any(|d| d.canonical_id == mode && d.is_primary_capable);
        if !offered {
            debug!("{} prefers '{}' but does not offer it", key, mode);
            return NavigationOutcome::new(event, request, NavigationStatus::NotOffered(mode));
        }

        let rewritten = inner.overrider.apply(request, Some(&mode));
        NavigationOutcome::new(event, rewritten, NavigationStatus::Applied(mode))
    }

    /// Record a mode switch. The save runs in the background; `None` means
    /// the switch was ignored (closed session or empty model/mode).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_mode_switch(&self, switch: ModeSwitch) -> Option<SaveHandle> {
        self.schedule_save(LifecycleEvent::ModeSwitched, switch)
    }

    /// Save whatever mode the host currently shows, waiting for the host
    /// to report one
    pub async fn remember_current_mode(&self) -> Option<SaveHandle> {
        if self.is_closed() {
            return None;
        }
        let limit = self.inner.config.readiness_timeout();
        let Some(view) = self.inner.readiness.wait_for_active_view(limit).await else {
            warn!("Host reported no active view within {:?}, nothing remembered", limit);
            return None;
        };
        self.schedule_save(LifecycleEvent::CurrentModeRemembered, ModeSwitch::from(view))
    }

    fn schedule_save(&self, event: LifecycleEvent, switch: ModeSwitch) -> Option<SaveHandle> {
        let inner = &self.inner;
        if self.is_closed() {
            debug!("Ignoring {} after session end", event);
            return None;
        }
        if switch.model.trim().is_empty() || switch.mode.trim().is_empty() {
            warn!("Ignoring {} with empty model or mode", event);
            return None;
        }

        let mode = inner.resolver.normalizer().normalize(switch.mode.trim());
        let key = PreferenceKey {
            user_id: inner.user_id.clone(),
            model: switch.model,
            action_id: switch.action_id,
        };
        let preference = Preference::new(key.clone(), mode).with_action_name(switch.action_name);
        let sequence = inner.sequence.fetch_add(1, Ordering::AcqRel) + 1;
        inner.pending.lock().insert(
            key.clone(),
            PendingSave {
                preference: preference.clone(),
                sequence,
            },
        );

        let engine = self.clone();
        let span = info_span!("save", session = %inner.session_id, key = %key, %event);
        let handle = inner.saves.spawn(
            async move { engine.run_save(key, preference, sequence).await }.instrument(span),
        );
        Some(SaveHandle::new(handle))
    }

    async fn run_save(&self, key: PreferenceKey, preference: Preference, sequence: u64) -> SaveOutcome {
        let guarded = self
            .inner
            .guard
            .with_guard(&key, LifecycleState::Saving, self.persist(&key, &preference))
            .await;
        let Some(outcome) = guarded else {
            debug!("Save for {} deferred, a cycle is already running", key);
            return SaveOutcome::Skipped;
        };

        if outcome.is_saved() {
            let mut pending = self.inner.pending.lock();
            if pending.get(&key).is_some_and(|p| p.sequence == sequence) {
                pending.remove(&key);
            }
        }
        outcome
    }

    async fn persist(&self, key: &PreferenceKey, preference: &Preference) -> SaveOutcome {
        let inner = &self.inner;
        let limit = inner.config.store_timeout();
        match bounded("preference save", limit, inner.store.save(preference)).await {
            Ok(true) => {
                inner.resolver.remember(key, preference);
                info!("Saved '{}' as last mode for {}", preference.mode, key);
                SaveOutcome::Saved
            }
            Ok(false) => {
                warn!("Store declined preference for {}", key);
                SaveOutcome::Declined
            }
            Err(e) => {
                warn!("Saving preference for {} failed: {}", key, e);
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    /// Tear the session down.
    ///
    /// Outstanding saves get the flush grace period to finish. Switches whose
    /// save never succeeded get one more attempt, then the local cache is
    /// cleared. Calling this twice is a no-op.
    pub async fn end_session(&self) -> SessionReport {
        let inner = &self.inner;
        if inner.closed.swap(true, Ordering::AcqRel) {
            return SessionReport::default();
        }
        inner.navigations.shutdown();
        inner.saves.close();

        let grace = inner.config.flush_timeout();
        let drained = tokio::time::timeout(grace, inner.saves.wait()).await.is_ok();
        if !drained {
            warn!("Background saves still running after {:?}", grace);
        }

        let mut leftovers: Vec<(PreferenceKey, PendingSave)> = inner.pending.lock().drain().collect();
        leftovers.sort_by_key(|(_, pending)| pending.sequence);

        let mut report = SessionReport {
            drained,
            ..SessionReport::default()
        };
        let attempts = leftovers.iter().map(|(key, pending)| async move {
            inner
                .guard
                .with_guard(key, LifecycleState::Saving, self.persist(key, &pending.preference))
                .await
                .unwrap_or(SaveOutcome::Skipped)
        });
        let outcomes = join_all(attempts).await;
        for ((key, _), outcome) in leftovers.iter().zip(outcomes) {
            if outcome.is_saved() {
                report.flushed += 1;
            } else {
                warn!("Dropping unsaved preference for {}: {:?}", key, outcome);
                report.abandoned += 1;
            }
        }

        report.cleared = inner.cache.clear();
        inner.readiness.clear();
        info!(
            "View preference session {} ended: {} flushed, {} abandoned, {} cache entries cleared",
            inner.session_id, report.flushed, report.abandoned, report.cleared
        );
        report
    }
}

#[async_trait]
impl NavigationHooks for ViewPreferenceEngine {
    async fn before_navigate(
        &self,
        origin: NavigationOrigin,
        request: NavigationRequest,
    ) -> NavigationRequest {
        self.navigate(origin.into(), request).await.into_request()
    }

    fn after_mode_switch(&self, switch: ModeSwitch) {
        let _ = self.on_mode_switch(switch);
    }

    async fn session_ended(&self) {
        self.end_session().await;
    }
}
