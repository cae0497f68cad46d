//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build client/server → Start listener
//!
//! Shutdown:
//!     Ctrl+C or trigger → stop accepting → drain in-flight streams → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
