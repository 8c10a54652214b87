//! Bundle fetching over HTTP
//!
//! A single blocking GET that reads the whole body into memory. Bundles
//! this tool targets are small enough that streaming is not worth the
//! complexity. The response's cache-validation headers are captured for
//! the version resolver.

use crate::error::{ZiplineError, ZiplineResult};
use std::io::Read;
use tracing::debug;

/// Identifying client header sent with every request
const USER_AGENT: &str = concat!("zipline/", env!("CARGO_PKG_VERSION"));

/// A fetched bundle plus its cache-validation metadata
#[derive(Debug, Clone)]
pub struct FetchedBundle {
    /// Raw archive bytes
    pub payload: Vec<u8>,

    /// `ETag` response header, quotes intact, empty when absent
    pub etag: String,

    /// `Last-Modified` response header, empty when absent
    pub last_modified: String,
}

/// Fetch the bundle at `url`.
///
/// Any transport or HTTP-status failure (DNS, refused connection, non-2xx)
/// is a [`ZiplineError::Network`]. Redirects are followed.
pub fn fetch(url: &str) -> ZiplineResult<FetchedBundle> {
    debug!("Fetching bundle from {}", url);

    let mut response = ureq::get(url)
        .header("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| ZiplineError::network(url, e))?;

    let header = |name: &str| -> String {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };
    let etag = header("etag");
    let last_modified = header("last-modified");

    let mut payload = Vec::new();
    response
        .body_mut()
        .as_reader()
        .read_to_end(&mut payload)
        .map_err(|e| ZiplineError::io(format!("reading bundle body from {}", url), e))?;

    debug!(
        "Fetched {} bytes (etag: {:?}, last-modified: {:?})",
        payload.len(),
        etag,
        last_modified
    );

    Ok(FetchedBundle {
        payload,
        etag,
        last_modified,
    })
}
