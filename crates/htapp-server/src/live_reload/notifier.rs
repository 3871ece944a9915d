//! Debounced reload notification.
//!
//! Editors often write a file several times per save, and a save can touch
//! several files at once. Every change re-arms a single timer; the reload
//! broadcast goes out once the timer runs a full window without another
//! change arriving.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::registry::{RELOAD_MESSAGE, SessionRegistry};

/// Coalesces bursts of change notifications into one reload broadcast.
pub(crate) struct DebouncedNotifier {
    registry: Arc<SessionRegistry>,
    window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebouncedNotifier {
    /// Create a notifier broadcasting to `registry` after `window` of quiet.
    pub(crate) fn new(registry: Arc<SessionRegistry>, window: Duration) -> Self {
        Self {
            registry,
            window,
            pending: Mutex::new(None),
        }
    }

    /// Record a change, cancelling any pending broadcast and re-arming the
    /// timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn notify(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.take() {
            timer.abort();
        }

        let registry = Arc::clone(&self.registry);
        let window = self.window;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if registry.is_empty() {
                tracing::debug!("No live reload sessions to notify");
                return;
            }
            tracing::info!(sessions = registry.len(), "Sending reload signal");
            registry.broadcast(RELOAD_MESSAGE);
        }));
    }
}

impl Drop for DebouncedNotifier {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.take() {
            timer.abort();
        }
    }
}
