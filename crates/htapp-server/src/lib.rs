//! Loopback HTTP server for htapp applications.
//!
//! Serves a local directory of HTML, CSS, and JavaScript as a desktop-style
//! application:
//! - `/app/` serves the directory, with every HTML document passed through
//!   [`htapp_html::transform`]
//! - `/file/` exposes local files for `file://` images
//! - `/embed/` serves the runtime scripts from `htapp-assets`
//! - `/api/` backs the `window.htapp` runtime API
//! - `/ws` notifies pages to reload after files change (development mode)
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use htapp_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         root_dir: PathBuf::from("my-app"),
//!         ..ServerConfig::default()
//!     };
//!
//!     let server = Server::bind(config).await.unwrap();
//!     println!("Open {}", server.app_url());
//!     server.serve(async { tokio::signal::ctrl_c().await.unwrap() }).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (htapp-server)
//!                        │
//!                        ├─► /app/*  ──► htapp-html transform (blocking pool)
//!                        │
//!                        ├─► /file/*, /favicon.ico ──► tower-http ServeFile
//!                        │
//!                        └─► /ws ──► SessionRegistry ◄── DebouncedNotifier
//!                                                              ▲
//!                                                   notify watcher (dev only)
//! ```

mod app;
mod error;
mod handlers;
mod live_reload;
mod middleware;
mod state;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

pub use error::ServerError;
use live_reload::LiveReloadManager;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on (0 picks a free port).
    pub port: u16,
    /// Application directory.
    pub root_dir: PathBuf,
    /// Document opened at startup, relative to `root_dir` (`None` for the
    /// directory index).
    pub entry: Option<String>,
    /// Enable development mode (live reload).
    pub live_reload_enabled: bool,
    /// Quiet period before a reload is sent.
    pub debounce: Duration,
    /// Extensions whose changes trigger a reload.
    pub watch_extensions: Vec<String>,
    /// Log every HTTP request.
    pub log_requests: bool,
    /// Extra arguments returned by `getArgs`.
    pub app_args: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let live_reload = htapp_config::LiveReloadConfig::default();
        Self {
            host: "127.0.0.1".to_owned(),
            port: 0,
            root_dir: PathBuf::from("."),
            entry: None,
            live_reload_enabled: false,
            debounce: live_reload.debounce(),
            watch_extensions: live_reload.extensions,
            log_requests: true,
            app_args: Vec::new(),
        }
    }
}

/// A bound, not yet running server.
///
/// Binding and serving are separate so the caller can learn the chosen port
/// (and open a browser on it) before requests are accepted.
pub struct Server {
    listener: TcpListener,
    router: Router,
    local_addr: SocketAddr,
    app_url: String,
}

impl Server {
    /// Bind the listening socket and build the router.
    ///
    /// In development mode this also starts the file watcher, so it must run
    /// inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        let live_reload = config.live_reload_enabled.then(|| {
            LiveReloadManager::start(&config.root_dir, config.watch_extensions, config.debounce)
        });

        let state = Arc::new(AppState {
            root_dir: config.root_dir,
            entry: config.entry,
            live_reload,
            app_args: config.app_args,
            log_requests: config.log_requests,
        });
        let app_url = format!("http://{local_addr}{}", state.entry_path());
        let router = app::create_router(state);

        tracing::info!(address = %local_addr, "Server listening");

        Ok(Self {
            listener,
            router,
            local_addr,
            app_url,
        })
    }

    /// Address the server is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URL of the entry document.
    #[must_use]
    pub fn app_url(&self) -> &str {
        &self.app_url
    }

    /// Serve requests until `shutdown` completes, then drain in-flight
    /// requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails while accepting connections.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Create server configuration from htapp config.
///
/// # Arguments
///
/// * `config` - Loaded htapp configuration
/// * `root_dir` - Application directory
/// * `entry` - Entry document inside `root_dir`, if not the index
/// * `app_args` - Extra command-line arguments for the page
#[must_use]
pub fn server_config_from_config(
    config: &htapp_config::Config,
    root_dir: PathBuf,
    entry: Option<String>,
    app_args: Vec<String>,
) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root_dir,
        entry,
        live_reload_enabled: config.live_reload.enabled,
        debounce: config.live_reload.debounce(),
        watch_extensions: config.live_reload.extensions.clone(),
        log_requests: config.server.log_requests,
        app_args,
    }
}
