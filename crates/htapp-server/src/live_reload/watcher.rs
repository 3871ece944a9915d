//! Filesystem change detection.
//!
//! Watches the document root recursively and reports content writes to files
//! whose extension is on the watch list. Creations, deletions, renames, and
//! metadata-only changes are ignored.

use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Filters raw filesystem events down to relevant file writes.
#[derive(Clone, Debug)]
pub(crate) struct ChangeDetector {
    extensions: Vec<String>,
}

impl ChangeDetector {
    /// Create a detector for the given extensions. A leading dot is
    /// optional and case is ignored.
    pub(crate) fn new(extensions: Vec<String>) -> Self {
        let extensions = extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(str::to_owned)
            .collect();
        Self { extensions }
    }

    /// Start watching `root`, forwarding raw events to `tx`.
    ///
    /// The returned watcher stops when dropped.
    pub(crate) fn watch(
        root: &Path,
        tx: mpsc::Sender<notify::Result<Event>>,
    ) -> notify::Result<RecommendedWatcher> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Callback runs on the watcher's own thread
            let _ = tx.blocking_send(res);
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(watcher)
    }

    /// Paths in `event` that count as a relevant change.
    pub(crate) fn changed_paths<'a>(&self, event: &'a Event) -> Vec<&'a PathBuf> {
        if !is_content_write(event.kind) {
            return Vec::new();
        }
        event
            .paths
            .iter()
            .filter(|path| self.is_watched(path))
            .collect()
    }

    /// Whether `path` has a watched extension.
    pub(crate) fn is_watched(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|watched| watched.eq_ignore_ascii_case(ext))
            })
    }
}

/// Only writes to file contents count. Backends that cannot tell what was
/// modified report `ModifyKind::Any`.
fn is_content_write(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any)
    )
}
