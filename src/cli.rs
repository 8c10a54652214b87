//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Zipline - Self-Updating Zip-Bundle Launcher
///
/// Fetches a remote zip bundle, verifies and caches it by version, then
/// runs the platform-appropriate entrypoint inside it. Everything after
/// the launcher's own flags is forwarded to the launched program.
#[derive(Parser, Debug)]
#[command(name = "zipline")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Delete this run's install directory after the child exits
    #[arg(long)]
    pub ephemeral: bool,

    /// Bypass the cached install and re-extract the bundle
    #[arg(long)]
    pub force_reinstall: bool,

    /// Override the bundle source URL
    #[arg(long, env = "ZIPLINE_BUNDLE_URL", value_name = "URL")]
    pub bundle_url: Option<String>,

    /// Override the expected SHA-256 digest (empty string disables verification)
    #[arg(long, env = "ZIPLINE_EXPECTED_SHA256", value_name = "HEX")]
    pub expected_sha256: Option<String>,

    /// Override the cache root directory
    #[arg(long, env = "ZIPLINE_CACHE_ROOT", value_name = "DIR")]
    pub cache_root: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, env = "ZIPLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Arguments forwarded verbatim to the launched program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<OsString>,
}
