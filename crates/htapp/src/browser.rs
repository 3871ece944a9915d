//! Chrome/Chromium launch in app mode.
//!
//! The application window is a browser started with `--app=<url>` and an
//! isolated profile, so it has no tabs or address bar and exits when the
//! user closes the window.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use htapp_html::AppOptions;
use tokio::process::{Child, Command};

/// Executable names searched on `PATH`.
const PATH_NAMES: &[&str] = &["google-chrome", "chromium", "chromium-browser", "chrome"];

/// Browser launch error.
#[derive(Debug, thiserror::Error)]
pub(crate) enum BrowserError {
    #[error("no Chrome or Chromium executable found")]
    NotFound,

    #[error("failed to start {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Arguments for opening `url` as an app window.
pub(crate) fn app_mode_args(
    url: &str,
    profile_dir: &Path,
    window: Option<AppOptions>,
) -> Vec<String> {
    let mut args = vec![
        format!("--app={url}"),
        format!("--user-data-dir={}", profile_dir.display()),
        "--no-first-run".to_owned(),
        "--no-default-browser-check".to_owned(),
    ];
    if let Some(window) = window {
        args.push(window.window_size_arg());
    }
    args
}

/// Locate a browser executable.
///
/// A configured path is used as given. Otherwise the platform's well-known
/// install locations are tried, then `PATH`.
pub(crate) fn find_browser(configured: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(PathBuf::from(path));
    }
    well_known_paths()
        .into_iter()
        .find(|path| path.is_file())
        .or_else(|| {
            let path_var = std::env::var_os("PATH")?;
            find_in_path(PATH_NAMES, &path_var)
        })
}

/// Start the browser.
///
/// The child is killed if its handle is dropped.
pub(crate) fn launch(executable: &Path, args: &[String]) -> Result<Child, BrowserError> {
    tracing::info!(browser = %executable.display(), "Launching browser");
    Command::new(executable)
        .args(args)
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| BrowserError::Spawn {
            path: executable.to_path_buf(),
            source,
        })
}

/// First file named one of `names` in the directories of `path_var`.
fn find_in_path(names: &[&str], path_var: &OsStr) -> Option<PathBuf> {
    let dirs: Vec<PathBuf> = std::env::split_paths(path_var).collect();
    names.iter().find_map(|name| {
        dirs.iter()
            .map(|dir| dir.join(executable_name(name)))
            .find(|candidate| candidate.is_file())
    })
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_owned()
    }
}

#[cfg(target_os = "macos")]
fn well_known_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
        PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
    ]
}

#[cfg(windows)]
fn well_known_paths() -> Vec<PathBuf> {
    ["ProgramFiles", "ProgramFiles(x86)", "LocalAppData"]
        .into_iter()
        .filter_map(std::env::var_os)
        .map(|base| PathBuf::from(base).join(r"Google\Chrome\Application\chrome.exe"))
        .collect()
}

#[cfg(not(any(target_os = "macos", windows)))]
fn well_known_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/bin/google-chrome"),
        PathBuf::from("/usr/bin/chromium"),
        PathBuf::from("/usr/bin/chromium-browser"),
        PathBuf::from("/snap/bin/chromium"),
    ]
}
