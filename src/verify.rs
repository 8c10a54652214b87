//! Payload integrity verification
//!
//! SHA-256 over the full payload, compared case-insensitively against the
//! expected hex digest. An empty expected value is an explicit opt-out.

use crate::error::{ZiplineError, ZiplineResult};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Verify `payload` against `expected` and return the computed hex digest.
///
/// The digest is returned even when verification is skipped because the
/// version resolver uses it as the tag of last resort.
pub fn verify(payload: &[u8], expected: &str) -> ZiplineResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    let computed = hex::encode(hasher.finalize());

    if expected.is_empty() {
        debug!("No expected digest configured, skipping verification");
        return Ok(computed);
    }

    if !computed.eq_ignore_ascii_case(expected) {
        return Err(ZiplineError::IntegrityMismatch {
            computed,
            expected: expected.to_string(),
        });
    }

    debug!("Payload digest verified: {}", computed);
    Ok(computed)
}
