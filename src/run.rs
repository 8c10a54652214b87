//! The launcher pipeline
//!
//! Strictly sequential: fetch, verify, derive tag, install, resolve
//! entrypoint, launch, then cleanup. Eviction runs after every launch and
//! is best-effort; an eviction failure never turns a successful run into a
//! failed one. Concurrent invocations sharing a cache root are not
//! coordinated (accepted limitation).

use crate::cache::CacheStore;
use crate::cli::Cli;
use crate::config::{Config, ConfigManager};
use crate::entrypoint::Platform;
use crate::error::ZiplineResult;
use crate::{entrypoint, fetch, launch, verify, version};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Effective settings after merging CLI flags over the config file
#[derive(Debug, Clone)]
pub struct Settings {
    pub bundle_url: String,
    pub expected_sha256: String,
    pub cache_root: PathBuf,
    pub keep_count: usize,
}

impl Settings {
    /// CLI flag > environment (via clap) > config file > built-in default
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            bundle_url: cli
                .bundle_url
                .clone()
                .unwrap_or_else(|| config.bundle.url.clone()),
            expected_sha256: cli
                .expected_sha256
                .clone()
                .unwrap_or_else(|| config.bundle.sha256.clone()),
            cache_root: cli
                .cache_root
                .clone()
                .or_else(|| config.cache.root.clone())
                .unwrap_or_else(ConfigManager::default_cache_root),
            keep_count: config.cache.keep,
        }
    }
}

/// Execute the full pipeline and return the child's exit code
pub fn run(cli: &Cli) -> ZiplineResult<i32> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = manager.load()?;
    let settings = Settings::resolve(cli, &config);

    let store = CacheStore::open(&settings.cache_root)?;

    let bundle = fetch::fetch(&settings.bundle_url)?;
    let digest = verify::verify(&bundle.payload, &settings.expected_sha256)?;

    let tag = version::resolve_tag(&bundle.etag, &bundle.last_modified, &digest);
    info!("Bundle version tag: {}", tag);

    let install_dir = store.install(&tag, &bundle.payload, cli.force_reinstall)?;

    let platform = Platform::current();
    let entry = entrypoint::resolve(&install_dir, platform)?;

    if let Err(e) = launch::make_executable(&entry) {
        debug!("Could not mark {} executable: {}", entry.display(), e);
    }

    let code = launch::launch(&entry, &cli.args, platform)?;
    debug!("Child exited with code {}", code);

    if cli.ephemeral {
        if let Err(e) = store.remove(&tag) {
            warn!("Failed to remove ephemeral install: {}", e);
        }
    }

    // Retention is best-effort by policy; never fail a finished run
    match store.evict(settings.keep_count) {
        Ok(0) => {}
        Ok(n) => debug!("Evicted {} old install(s)", n),
        Err(e) => warn!("Cache eviction failed: {}", e),
    }

    Ok(code)
}
