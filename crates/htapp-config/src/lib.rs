//! Configuration management for htapp.
//!
//! Parses `htapp.toml` configuration files with serde and provides
//! auto-discovery of config files next to the served document and in
//! parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `browser.executable`
//! - `browser.profile_dir`

mod expand;

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override development mode (live reload and dev script injection).
    pub dev_mode: Option<bool>,
    /// Override browser launch flag.
    pub browser_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "htapp.toml";

/// Default quiescence window for live reload, in milliseconds.
const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Upper bound for `live_reload.debounce_ms`.
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Profile directory name used under the system temp dir.
const DEFAULT_PROFILE_DIR: &str = "htapp-browser-profile";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Live reload configuration.
    pub live_reload: LiveReloadConfig,
    /// Browser launch configuration.
    pub browser: BrowserConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address. Must be a loopback address.
    pub host: String,
    /// Server port (0 picks an ephemeral port).
    pub port: u16,
    /// Log every HTTP request.
    pub log_requests: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 0,
            log_requests: true,
        }
    }
}

/// Live reload configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LiveReloadConfig {
    /// Whether development mode is enabled.
    ///
    /// Defaults to on for builds with the `dev` feature.
    pub enabled: bool,
    /// Quiescence window before a coalesced reload is sent.
    pub debounce_ms: u64,
    /// File extensions (without dot) whose writes trigger a reload.
    pub extensions: Vec<String>,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "dev"),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            extensions: ["html", "css", "js", "json", "xml"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl LiveReloadConfig {
    /// Quiescence window as a [`Duration`].
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Browser launch configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Launch a browser in app mode after the server starts.
    pub enabled: bool,
    /// Explicit browser executable (default: auto-detect Chrome/Chromium).
    pub executable: Option<String>,
    /// Isolated browser profile directory.
    pub profile_dir: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            executable: None,
            profile_dir: None,
        }
    }
}

impl BrowserConfig {
    /// Profile directory, falling back to `<tmp>/htapp-browser-profile`.
    #[must_use]
    pub fn profile_dir(&self) -> PathBuf {
        self.profile_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_PROFILE_DIR))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`HTAPP_HOST`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `htapp.toml` in `search_from` (usually the document root) and its
    /// parents, then in the current directory and its parents.
    ///
    /// CLI settings are applied after loading, so CLI arguments take
    /// precedence over config file values. Validation runs last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        search_from: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config(search_from) {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(dev_mode) = settings.dev_mode {
            self.live_reload.enabled = dev_mode;
        }
        if let Some(browser_enabled) = settings.browser_enabled {
            self.browser.enabled = browser_enabled;
        }
    }

    /// Search for the config file, first from `start`, then from the cwd.
    fn discover_config(start: Option<&Path>) -> Option<PathBuf> {
        start
            .and_then(Self::search_upwards)
            .or_else(|| Self::search_upwards(&std::env::current_dir().ok()?))
    }

    /// Search `dir` and its parents for `htapp.toml`.
    fn search_upwards(dir: &Path) -> Option<PathBuf> {
        let mut current = dir.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically at the end of [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_live_reload()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        let host = self.server.host.as_str();
        if host.is_empty() {
            return Err(ConfigError::Validation(
                "server.host cannot be empty".to_owned(),
            ));
        }

        // The server exposes local files under /file/, so it never leaves loopback
        let is_loopback = host.eq_ignore_ascii_case("localhost")
            || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback());
        if !is_loopback {
            return Err(ConfigError::Validation(format!(
                "server.host must be a loopback address, got {host}"
            )));
        }

        Ok(())
    }

    /// Validate live reload configuration.
    fn validate_live_reload(&self) -> Result<(), ConfigError> {
        let debounce_ms = self.live_reload.debounce_ms;
        if debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "live_reload.debounce_ms must be greater than 0".to_owned(),
            ));
        }
        if debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Validation(format!(
                "live_reload.debounce_ms cannot exceed {MAX_DEBOUNCE_MS}"
            )));
        }

        if self.live_reload.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "live_reload.extensions cannot be empty".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref executable) = self.browser.executable {
            self.browser.executable =
                Some(expand::expand_env(executable, "browser.executable")?);
        }

        if let Some(ref profile_dir) = self.browser.profile_dir {
            let expanded =
                expand::expand_env(&profile_dir.to_string_lossy(), "browser.profile_dir")?;
            self.browser.profile_dir = Some(PathBuf::from(expanded));
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory and normalize
    /// the extension list.
    fn resolve_paths(&mut self, config_dir: &Path) {
        if let Some(ref profile_dir) = self.browser.profile_dir {
            self.browser.profile_dir = Some(config_dir.join(profile_dir));
        }

        self.live_reload.extensions = self
            .live_reload
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
    }
}
