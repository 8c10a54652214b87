//! Zipline - Self-Updating Zip-Bundle Launcher
//!
//! Fetches a versioned zip bundle over HTTP, verifies its SHA-256 digest,
//! caches the extracted contents keyed by a derived version tag, then runs
//! the platform-appropriate entrypoint with pass-through arguments.

pub mod archive;
pub mod cache;
pub mod cli;
pub mod config;
pub mod entrypoint;
pub mod error;
pub mod fetch;
pub mod launch;
pub mod run;
pub mod verify;
pub mod version;

pub use error::{ZiplineError, ZiplineResult};
