//! Origin/Referer access checks.
//!
//! This is a hot-link deterrent, not authentication: both headers are
//! attacker-controlled on non-browser clients, so a match must never be
//! treated as proof of identity. Stronger schemes (signed URLs, tokens)
//! belong in a layer above this one.

use crate::config::MatchStrategy;
use crate::security::RejectReason;

/// Authorize a request by its declared Origin and Referer headers.
///
/// Passes when either header matches `allowed_origin` under the configured
/// strategy. Absent headers are treated as empty strings, which only match
/// when `allowed_origin` is itself empty under prefix matching.
pub fn authorize(
    declared_origin: &str,
    declared_referer: &str,
    allowed_origin: &str,
    strategy: MatchStrategy,
) -> Result<(), RejectReason> {
    let matches = |value: &str| match strategy {
        MatchStrategy::Prefix => value.starts_with(allowed_origin),
        MatchStrategy::Exact => value == allowed_origin,
    };

    if matches(declared_origin) || matches(declared_referer) {
        Ok(())
    } else {
        Err(RejectReason::OriginBlocked)
    }
}
