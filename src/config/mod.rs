//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overlay for secrets)
//!     → validation.rs (semantic checks, all errors collected)
//!     → EdgeConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Secrets (the service key) come from the environment, never logged
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AccessConfig;
pub use schema::EdgeConfig;
pub use schema::MatchStrategy;
pub use schema::UpstreamConfig;
