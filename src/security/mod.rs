//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → path.rs (filename safety: traversal, separators, extension)
//!     → access.rs (Origin/Referer vs allowed origin)
//!     → [upstream fetch happens only if both pass]
//! Upstream response:
//!     → headers.rs (project headers down to the fixed allow-list)
//! ```
//!
//! # Design Decisions
//! - Fail closed: any check failure rejects the request before network I/O
//! - Checks are pure functions over strings/header maps; no shared state
//! - Rejection reasons are typed and mapped to HTTP statuses at the
//!   handler boundary only

pub mod access;
pub mod headers;
pub mod path;

use thiserror::Error;

/// Why a request was rejected before the upstream fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Filename failed the path safety checks.
    #[error("unsafe path")]
    PathUnsafe,

    /// Neither Origin nor Referer matched the allowed origin.
    #[error("origin blocked")]
    OriginBlocked,
}
