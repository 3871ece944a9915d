//! htapp CLI - run a local HTML application in a browser window.
//!
//! Serves a directory (or a single HTML file and its siblings) on a loopback
//! port and opens it in Chrome/Chromium app mode. The server stops when the
//! window closes. With `--dev`, pages reload after their files change.

mod browser;
mod error;
mod output;
mod serve;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use error::CliError;
use output::Output;
use serve::ServeArgs;

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "warn,htapp=info,tower_http=info";

/// htapp - run a local HTML application in a browser window.
#[derive(Parser)]
#[command(name = "htapp", version, about)]
struct Cli {
    #[command(flatten)]
    args: ServeArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO everywhere, otherwise use RUST_LOG or the default
    let filter = if cli.args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = tokio::runtime::Runtime::new()
        .map_err(CliError::from)
        .and_then(|rt| rt.block_on(cli.args.execute()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_path_is_required() {
        assert!(Cli::try_parse_from(["htapp"]).is_err());
    }
}
