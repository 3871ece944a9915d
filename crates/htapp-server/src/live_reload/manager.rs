//! Live reload manager.
//!
//! Wires the change detector to the debounced notifier and owns the session
//! registry that WebSocket connections join.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, RecommendedWatcher};
use tokio::sync::mpsc;

use super::notifier::DebouncedNotifier;
use super::registry::SessionRegistry;
use super::watcher::ChangeDetector;

/// Capacity of the channel between the watcher thread and the async task.
const EVENT_BUFFER: usize = 100;

/// Manages file watching and reload broadcasting.
pub(crate) struct LiveReloadManager {
    registry: Arc<SessionRegistry>,
    /// Kept alive for the lifetime of the manager; `None` when watching failed.
    watcher: Option<RecommendedWatcher>,
}

impl LiveReloadManager {
    /// Start watching `root` for writes to files with the given extensions.
    ///
    /// A watcher that cannot be set up is logged and the manager keeps
    /// serving WebSocket sessions without ever reloading them.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn start(root: &Path, extensions: Vec<String>, debounce: Duration) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let notifier = DebouncedNotifier::new(Arc::clone(&registry), debounce);
        let detector = ChangeDetector::new(extensions);

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let watcher = match ChangeDetector::watch(root, tx) {
            Ok(watcher) => {
                tracing::info!(path = %root.display(), "Watching for changes");
                tokio::spawn(forward_changes(rx, detector, notifier));
                Some(watcher)
            }
            Err(e) => {
                tracing::warn!(
                    path = %root.display(),
                    error = %e,
                    "Could not watch for changes, live reload disabled"
                );
                None
            }
        };

        Self { registry, watcher }
    }

    /// Registry of connected live reload sessions.
    pub(crate) fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Whether filesystem watching is active.
    pub(crate) fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }
}

/// Feed relevant changes to the notifier until the watcher is dropped.
async fn forward_changes(
    mut rx: mpsc::Receiver<notify::Result<Event>>,
    detector: ChangeDetector,
    notifier: DebouncedNotifier,
) {
    while let Some(res) = rx.recv().await {
        match res {
            Ok(event) => {
                for path in detector.changed_paths(&event) {
                    tracing::info!(path = %path.display(), "File changed");
                    notifier.notify();
                }
            }
            Err(e) => tracing::warn!(error = %e, "File watcher error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live_reload::registry::Session;

    fn extensions() -> Vec<String> {
        vec!["html".to_owned(), "css".to_owned()]
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_write_triggers_reload() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("style.css");
        std::fs::write(&file, "body {}").unwrap();

        let manager = LiveReloadManager::start(dir.path(), extensions(), Duration::from_millis(50));
        assert!(manager.is_watching());
        let (session, mut rx) = Session::channel();
        manager.registry().add(session);

        std::fs::write(&file, "body { color: red; }").unwrap();

        let message = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no reload within timeout");
        assert_eq!(message.as_deref(), Some("reload"));
    }

    #[tokio::test]
    async fn test_missing_root_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let manager = LiveReloadManager::start(&missing, extensions(), Duration::from_millis(50));

        assert!(!manager.is_watching());
        assert_eq!(manager.registry().len(), 0);
    }
}
