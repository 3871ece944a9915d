//! Live reload system for development mode.
//!
//! Watches the document root and tells connected WebSocket clients to reload
//! once a burst of file writes has settled.

mod manager;
mod notifier;
mod registry;
mod watcher;
mod websocket;

pub(crate) use manager::LiveReloadManager;
pub(crate) use websocket::ws_handler;
