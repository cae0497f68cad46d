//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge
//! node. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge node.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream Pipe KV store settings.
    pub upstream: UpstreamConfig,

    /// Access control settings.
    pub access: AccessConfig,

    /// Playlist response settings.
    pub playlist: PlaylistConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream key-value store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the KV store (e.g., "https://203.0.113.10").
    pub base_url: String,

    /// Service credential sent as `X-Service-Key`. Expected format is a
    /// 36-character hyphenated hex identifier. Usually supplied via the
    /// `STREAMNODE_SERVICE_KEY` environment variable rather than the file.
    pub service_key: String,

    /// Timeout for the request/response-headers phase in seconds.
    /// The streaming phase of segment relays is not bounded by this.
    pub timeout_secs: u64,

    /// Optional path to a PEM certificate to pin for the upstream. When set,
    /// it becomes the only trusted root; verification is never disabled.
    pub pinned_cert_path: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            service_key: String::new(),
            timeout_secs: 10,
            pinned_cert_path: None,
        }
    }
}

/// Strategy for comparing Origin/Referer headers against the allowed origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Header must start with the allowed origin string.
    #[default]
    Prefix,
    /// Header must equal the allowed origin string.
    Exact,
}

/// Access control configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Origin allowed to fetch assets (e.g., "https://player.example.com").
    /// Also used as the CORS allow-origin value.
    pub allowed_origin: String,

    /// How Origin/Referer headers are compared against `allowed_origin`.
    pub match_strategy: MatchStrategy,

    /// Whether filename extensions are matched case-sensitively.
    pub case_sensitive_extensions: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allowed_origin: String::new(),
            match_strategy: MatchStrategy::Prefix,
            case_sensitive_extensions: true,
        }
    }
}

/// Playlist response configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// `max-age` for the `Cache-Control: public` directive on playlists.
    pub cache_max_age_secs: u64,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            cache_max_age_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
