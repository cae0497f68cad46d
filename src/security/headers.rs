//! Upstream response header filtering.
//!
//! Only a fixed allow-list of headers may cross from the KV store to the
//! client; everything else (cookies, internal diagnostics) is dropped.
//! Values are passed through untouched.

use axum::http::HeaderMap;

/// Headers permitted to cross from upstream response to client response.
pub const RESPONSE_ALLOW_LIST: &[&str] = &[
    "content-type",
    "content-length",
    "x-cache",
    "x-cache-node",
    "x-kv-version",
    "x-kv-latency-ms",
    "accept-ranges",
];

/// Whether a header name (compared case-insensitively) is allow-listed.
pub fn is_allowed(name: &str) -> bool {
    RESPONSE_ALLOW_LIST
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(name))
}

/// Project an upstream header map down to the allow-list.
///
/// Names are normalized to lowercase by the `http` types; duplicate entries
/// collapse to one, last writer wins.
pub fn filter(upstream: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for (name, value) in upstream.iter() {
        if is_allowed(name.as_str()) {
            filtered.insert(name.clone(), value.clone());
        }
    }
    filtered
}
