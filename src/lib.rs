//! Streamnode — HLS edge proxy for a Pipe KV object store.
//!
//! # Architecture Overview
//!
//! ```text
//! Client request
//!     → http/server.rs (Axum setup, middleware)
//!     → http/handlers.rs (per-route orchestration)
//!         → security/path.rs    (filename safety)
//!         → security/access.rs  (Origin/Referer check)
//!         → upstream/client.rs  (GET {base}/kv/{key})
//!         → security/headers.rs (response header allow-list)
//!     → playlist: buffered body / segment: streamed body
//! Client response
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod upstream;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::EdgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
