//! Version tag derivation
//!
//! A version tag names one cached install on disk. Server metadata is
//! preferred because it is stable across repeated fetches of unchanged
//! content; the digest prefix is the always-available fallback. A server
//! that reuses an ETag for changed content defeats the cache — that is the
//! server's bug, not ours, and is not re-verified here.

/// Hex characters of the digest used when no server metadata is available
const DIGEST_TAG_LEN: usize = 12;

/// Derive the version tag for a fetched payload.
///
/// Priority: quote-stripped ETag, then Last-Modified, then the first
/// 12 hex characters of the content digest. Pure and deterministic;
/// never returns an empty string because the digest always exists.
pub fn resolve_tag(etag: &str, last_modified: &str, digest: &str) -> String {
    let validator = etag.trim().trim_matches('"');
    if !validator.is_empty() {
        return sanitize(validator);
    }

    let stamp = last_modified.trim();
    if !stamp.is_empty() {
        return sanitize(stamp);
    }

    digest[..DIGEST_TAG_LEN.min(digest.len())].to_string()
}

/// Make a tag safe to use as a directory name.
///
/// ETags and HTTP dates carry characters that are hostile to at least one
/// supported filesystem (`"`, `:`, spaces); everything outside
/// `[A-Za-z0-9._-]` collapses to `-`.
fn sanitize(tag: &str) -> String {
    tag.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
