//! Host readiness signal

use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// The view the host currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveView {
    pub model: String,
    pub action_id: Option<String>,
    pub action_name: Option<String>,
    /// Mode as the host names it; normalized by the engine
    pub mode: String,
}

impl ActiveView {
    pub fn new(model: impl Into<String>, action_id: Option<impl Into<String>>, mode: impl Into<String>) -> Self {
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

/// Published by the host when its active view changes
#[derive(Debug)]
pub struct HostReadiness {
    tx: watch::Sender<Option<ActiveView>>,
}

impl Default for HostReadiness {
    fn default() -> Self {
        Self::new()
    }
}

impl HostReadiness {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn publish(&self, view: ActiveView) {
        debug!("Host active view: {} ({})", view.model, view.mode);
        self.tx.send_replace(Some(view));
    }

    /// The host tore its view down
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<ActiveView> {
        self.tx.borrow().clone()
    }

    /// Wait up to `limit` for the host to report an active view
    pub async fn wait_for_active_view(&self, limit: Duration) -> Option<ActiveView> {
        let mut rx = self.tx.subscribe();
        match tokio::time::timeout(limit, rx.wait_for(Option::is_some)).await {
            Ok(Ok(view)) => view.clone(),
            Ok(Err(_)) => None,
            Err(_) => {
                debug!("No active view reported within {:?}", limit);
                None
            }
        }
    }
}
