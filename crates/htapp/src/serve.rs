//! Serve an application and open it in a browser window.

use std::path::{Path, PathBuf};

use clap::Args;
use htapp_config::{CliSettings, Config};
use htapp_html::AppOptions;
use htapp_server::{Server, server_config_from_config};
use tokio::process::Child;

use crate::browser::{self, BrowserError};
use crate::error::CliError;
use crate::output::Output;

/// Document served for a directory.
const INDEX_FILE: &str = "index.html";

/// Arguments for serving an application.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// HTML file, or directory containing index.html.
    path: PathBuf,

    /// Arguments passed to the application (see `htapp.core.getArgs()`).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    app_args: Vec<String>,

    /// Path to configuration file (default: auto-discover htapp.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode: live reload on file changes.
    #[arg(long)]
    dev: bool,

    /// Disable development mode.
    #[arg(long, conflicts_with = "dev")]
    no_dev: bool,

    /// Do not launch a browser; only print the URL.
    #[arg(long)]
    no_browser: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Application to serve, resolved from the path argument.
#[derive(Debug, PartialEq, Eq)]
struct Target {
    /// Directory served under `/app/`.
    root_dir: PathBuf,
    /// Document opened at startup, if not the directory index.
    entry: Option<String>,
}

impl Target {
    /// Resolve and check the path argument.
    fn resolve(path: &Path) -> Result<Self, CliError> {
        let path = std::fs::canonicalize(path).map_err(|e| {
            CliError::Validation(format!("Cannot open {}: {e}", path.display()))
        })?;

        if path.is_dir() {
            if !path.join(INDEX_FILE).is_file() {
                return Err(CliError::Validation(format!(
                    "No {INDEX_FILE} in {}",
                    path.display()
                )));
            }
            return Ok(Self {
                root_dir: path,
                entry: None,
            });
        }

        let root_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let entry = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(Self { root_dir, entry })
    }

    /// Path of the document opened at startup.
    fn entry_file(&self) -> PathBuf {
        self.root_dir
            .join(self.entry.as_deref().unwrap_or(INDEX_FILE))
    }
}

impl ServeArgs {
    /// Serve the application until the browser window closes or Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid, configuration fails, or the
    /// server cannot start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let dev_mode = self.resolve_dev_mode();
        let target = Target::resolve(&self.path)?;

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            dev_mode,
            browser_enabled: self.no_browser.then_some(false),
        };
        let config = Config::load(
            self.config.as_deref(),
            Some(&target.root_dir),
            Some(&cli_settings),
        )?;
        if let Some(path) = &config.config_path {
            output.field("Config", path.display());
        }

        let window = read_app_options(&target.entry_file());
        let server_config = server_config_from_config(
            &config,
            target.root_dir.clone(),
            target.entry.clone(),
            self.app_args,
        );
        let server = Server::bind(server_config).await?;
        let url = server.app_url().to_owned();

        output.field("Serving", target.root_dir.display());
        output.url("Application", &url);
        if config.live_reload.enabled {
            output.field("Live reload", "enabled");
        }

        let browser = config
            .browser
            .enabled
            .then(|| start_browser(&config, &url, window));

        if let Some(Ok(child)) = browser {
            output.success("Application window opened; closing it stops the server.");
            server.serve(wait_for_browser(child)).await?;
        } else {
            if let Some(Err(e)) = browser {
                output.warning(&format!("Could not open a browser window: {e}"));
            }
            output.info(&format!("Open {url} in your browser. Press Ctrl-C to stop."));
            server.serve(shutdown_signal()).await?;
        }

        if config.browser.enabled && config.browser.profile_dir.is_none() {
            remove_profile_dir(&config.browser.profile_dir());
        }
        Ok(())
    }

    /// Resolve `dev_mode` from --dev/--no-dev flags.
    fn resolve_dev_mode(&self) -> Option<bool> {
        self.no_dev
            .then_some(false)
            .or_else(|| self.dev.then_some(true))
    }
}

/// Read window options from the entry document, if it declares any.
fn read_app_options(path: &Path) -> Option<AppOptions> {
    let source = std::fs::read(path)
        .inspect_err(|e| tracing::debug!(path = %path.display(), error = %e, "Cannot read entry document"))
        .ok()?;
    let document = htapp_html::parse_document(&source).ok()?;
    let options = htapp_html::find_app_options(&document)?;
    tracing::info!(width = options.width, height = options.height, "Window size from document");
    Some(options)
}

fn start_browser(
    config: &Config,
    url: &str,
    window: Option<AppOptions>,
) -> Result<Child, BrowserError> {
    let executable =
        browser::find_browser(config.browser.executable.as_deref()).ok_or(BrowserError::NotFound)?;
    let args = browser::app_mode_args(url, &config.browser.profile_dir(), window);
    browser::launch(&executable, &args)
}

/// Complete when the browser exits or on a shutdown signal, which also
/// kills the browser.
async fn wait_for_browser(mut child: Child) {
    tokio::select! {
        status = child.wait() => {
            match status {
                Ok(status) => tracing::info!(%status, "Browser closed, shutting down"),
                Err(e) => tracing::warn!(error = %e, "Lost track of browser process, shutting down"),
            }
        }
        () = shutdown_signal() => {
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "Failed to stop browser");
            }
        }
    }
}

/// Wait for Ctrl-C (or SIGTERM on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

fn remove_profile_dir(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed browser profile"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove browser profile"),
    }
}
