//! Upstream Pipe KV client subsystem.
//!
//! # Data Flow
//! ```text
//! object key (validated filename)
//!     → client.rs builds GET {base_url}/kv/{key}
//!       with X-Service-Key and Accept: */*
//!     → bounded wait for response headers (timeout_secs)
//!     → Response handed to the handler: status + headers + byte stream
//! ```
//!
//! # Design Decisions
//! - Non-2xx statuses are successful transport exchanges; the handler maps
//!   them, never this client
//! - The timeout covers the request/headers phase only; relaying a large
//!   segment body is legitimately slower and is not bounded here
//! - TLS verification is never disabled; a self-issued origin certificate
//!   is supported by pinning it as the only trust root

pub mod client;

pub use client::{ClientBuildError, OriginClient, TransportError};
