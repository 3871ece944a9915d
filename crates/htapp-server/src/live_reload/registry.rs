//! Registry of connected live reload clients.
//!
//! Each WebSocket connection registers a [`Session`] holding the sending half
//! of an unbounded channel; the connection task owns the receiving half and
//! forwards messages to the socket. A send fails only once that task has gone
//! away, so failed sessions are dropped from the registry during broadcast.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc;
use uuid::Uuid;

/// Message telling clients to reload the page.
pub(crate) const RELOAD_MESSAGE: &str = "reload";

/// Unique identifier of a live reload session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One connected client.
#[derive(Debug)]
pub(crate) struct Session {
    tx: mpsc::UnboundedSender<String>,
}

impl Session {
    /// Create a session and the receiver its connection task reads from.
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, message: &str) -> Result<(), mpsc::error::SendError<String>> {
        self.tx.send(message.to_owned())
    }
}

/// Thread-safe set of live sessions.
///
/// `add`, `remove`, and `broadcast` all take the write lock, so a broadcast
/// pass never observes a session being added or removed halfway through.
#[derive(Debug, Default)]
pub(crate) struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl SessionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a session and return its identifier.
    pub(crate) fn add(&self, session: Session) -> SessionId {
        let id = SessionId::new();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(id, session);
        tracing::debug!(session = %id, total = sessions.len(), "Live reload session added");
        id
    }

    /// Remove a session. Removing an unknown identifier is a no-op.
    pub(crate) fn remove(&self, id: SessionId) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if sessions.remove(&id).is_some() {
            tracing::debug!(session = %id, total = sessions.len(), "Live reload session removed");
        }
    }

    /// Send `message` to every session, dropping those whose send fails.
    pub(crate) fn broadcast(&self, message: &str) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|id, session| match session.send(message) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(session = %id, "Dropping disconnected live reload session");
                false
            }
        });
        if sessions.len() != before {
            tracing::debug!(
                removed = before - sessions.len(),
                total = sessions.len(),
                "Live reload sessions pruned"
            );
        }
    }

    /// Number of registered sessions.
    pub(crate) fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: SessionId) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use pretty_assertions::assert_eq;

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
        let mut messages = Vec::new();
        while let Ok(message) = rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    #[test]
    fn test_add_and_remove() {
        let registry = SessionRegistry::new();
        let (session, _rx) = Session::channel();

        let id = registry.add(session);
        assert!(registry.contains(id));
        assert_eq!(registry.len(), 1);

        registry.remove(id);
        assert!(!registry.contains(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let registry = SessionRegistry::new();
        let (session, _rx) = Session::channel();
        let id = registry.add(session);
        registry.remove(id);

        registry.remove(id);

        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_identifiers_are_unique() {
        let registry = SessionRegistry::new();
        let (a, _rx_a) = Session::channel();
        let (b, _rx_b) = Session::channel();

        assert_ne!(registry.add(a), registry.add(b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_broadcast_reaches_every_session() {
        let registry = SessionRegistry::new();
        let (a, mut rx_a) = Session::channel();
        let (b, mut rx_b) = Session::channel();
        registry.add(a);
        registry.add(b);

        registry.broadcast(RELOAD_MESSAGE);

        assert_eq!(drain(&mut rx_a), vec!["reload"]);
        assert_eq!(drain(&mut rx_b), vec!["reload"]);
    }

    #[test]
    fn test_broadcast_with_no_sessions() {
        let registry = SessionRegistry::new();
        registry.broadcast(RELOAD_MESSAGE);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_broadcast_prunes_failed_session() {
        let registry = SessionRegistry::new();
        let (a, mut rx_a) = Session::channel();
        let (b, rx_b) = Session::channel();
        let (c, mut rx_c) = Session::channel();
        let id_a = registry.add(a);
        let id_b = registry.add(b);
        let id_c = registry.add(c);
        drop(rx_b);

        registry.broadcast(RELOAD_MESSAGE);

        assert_eq!(drain(&mut rx_a), vec!["reload"]);
        assert_eq!(drain(&mut rx_c), vec!["reload"]);
        assert!(registry.contains(id_a));
        assert!(!registry.contains(id_b));
        assert!(registry.contains(id_c));

        // The pruned session is not retried
        registry.broadcast(RELOAD_MESSAGE);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_broadcast_prunes_every_failed_session() {
        let registry = SessionRegistry::new();
        let (live, mut rx) = Session::channel();
        registry.add(live);
        for _ in 0..3 {
            let (dead, _) = Session::channel();
            registry.add(dead);
        }
        assert_eq!(registry.len(), 4);

        registry.broadcast(RELOAD_MESSAGE);

        assert_eq!(registry.len(), 1);
        assert_eq!(drain(&mut rx), vec!["reload"]);
    }

    #[test]
    fn test_concurrent_add_remove_broadcast() {
        let registry = Arc::new(SessionRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let (session, mut rx) = Session::channel();
                        let id = registry.add(session);
                        registry.broadcast(RELOAD_MESSAGE);
                        assert!(!drain(&mut rx).is_empty());
                        registry.remove(id);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 0);
    }
}
