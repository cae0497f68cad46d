//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the service credential format before any request is served
//! - Validate value ranges (timeouts > 0) and URL syntax
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system; failures are fatal
//!   at startup, never at request time

use std::sync::LazyLock;

use axum::http::HeaderValue;
use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::config::schema::EdgeConfig;

/// 36-character hyphenated hex identifier, hex case ignored.
static SERVICE_KEY_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)[a-f0-9-]{36}$").expect("static regex"));

/// A single semantic configuration error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("upstream.service_key is missing (set STREAMNODE_SERVICE_KEY)")]
    MissingServiceKey,

    #[error("upstream.service_key is malformed (expected 36-char hyphenated hex)")]
    MalformedServiceKey,

    #[error("upstream.base_url is missing")]
    MissingBaseUrl,

    #[error("upstream.base_url is not a valid URL: {0}")]
    InvalidBaseUrl(String),

    #[error("upstream.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("access.allowed_origin is missing")]
    MissingAllowedOrigin,

    #[error("access.allowed_origin is not a valid header value")]
    InvalidAllowedOrigin,

    #[error("listener.bind_address is not a valid socket address: {0}")]
    InvalidBindAddress(String),
}

/// Validate an [`EdgeConfig`], collecting every error found.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.service_key.is_empty() {
        errors.push(ValidationError::MissingServiceKey);
    } else if !SERVICE_KEY_FORMAT.is_match(&config.upstream.service_key) {
        errors.push(ValidationError::MalformedServiceKey);
    }

    if config.upstream.base_url.is_empty() {
        errors.push(ValidationError::MissingBaseUrl);
    } else if Url::parse(&config.upstream.base_url).is_err() {
        errors.push(ValidationError::InvalidBaseUrl(
            config.upstream.base_url.clone(),
        ));
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.access.allowed_origin.is_empty() {
        errors.push(ValidationError::MissingAllowedOrigin);
    } else if HeaderValue::from_str(&config.access.allowed_origin).is_err() {
        errors.push(ValidationError::InvalidAllowedOrigin);
    }

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
