//! Filename safety checks.
//!
//! The filename becomes the upstream object key verbatim, so it is screened
//! here before any network I/O. Pure string inspection; no filesystem access.

use crate::security::RejectReason;

/// Validate a client-supplied filename against an extension allow-list.
///
/// Rejects when the filename contains a parent-directory sequence (`..`),
/// a path separator (`/` or `\`), or does not end with one of
/// `allowed_extensions`. An empty filename always fails the extension check.
pub fn validate(
    filename: &str,
    allowed_extensions: &[&str],
    case_sensitive: bool,
) -> Result<(), RejectReason> {
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(RejectReason::PathUnsafe);
    }

    let has_allowed_extension = if case_sensitive {
        allowed_extensions.iter().any(|ext| filename.ends_with(ext))
    } else {
        let lowered = filename.to_ascii_lowercase();
        allowed_extensions
            .iter()
            .any(|ext| lowered.ends_with(&ext.to_ascii_lowercase()))
    };

    if has_allowed_extension {
        Ok(())
    } else {
        Err(RejectReason::PathUnsafe)
    }
}
