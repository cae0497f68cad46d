//! HTTP client for the upstream Pipe KV store.

use std::fs;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;

/// Header carrying the service credential to the KV store.
pub const X_SERVICE_KEY: &str = "x-service-key";

/// Transport-level failure talking to the KV store.
///
/// Only failures of the exchange itself live here; an upstream 404 or 500
/// is a successful exchange and is returned as a normal response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request/headers phase exceeded the configured timeout.
    #[error("upstream request timed out")]
    Timeout,

    /// Connection could not be established or failed mid-exchange.
    #[error("upstream connection failed: {0}")]
    ConnectionFailed(#[source] reqwest::Error),
}

/// Failure constructing the client at startup.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid upstream base URL {url:?}: {source}")]
    BaseUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("service key is not a valid header value")]
    ServiceKey,

    #[error("failed to read pinned certificate {path:?}: {source}")]
    ReadPinnedCert {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid pinned certificate: {0}")]
    InvalidPinnedCert(#[source] reqwest::Error),

    #[error("failed to build upstream HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// Client issuing object fetches against the KV store.
///
/// Cheap to clone is not needed: one instance is shared via `Arc` and the
/// inner `reqwest::Client` pools connections safely across requests.
pub struct OriginClient {
    client: reqwest::Client,
    base_url: Url,
    service_key: HeaderValue,
    timeout: Duration,
}

impl OriginClient {
    /// Build the client from validated configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientBuildError> {
        let base_url = Url::parse(&config.base_url).map_err(|source| ClientBuildError::BaseUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let mut service_key = HeaderValue::from_str(&config.service_key)
            .map_err(|_| ClientBuildError::ServiceKey)?;
        service_key.set_sensitive(true);

        let mut builder = reqwest::Client::builder();
        if let Some(path) = &config.pinned_cert_path {
            let pem = fs::read(path).map_err(|source| ClientBuildError::ReadPinnedCert {
                path: path.clone(),
                source,
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(ClientBuildError::InvalidPinnedCert)?;
            // The pinned certificate becomes the only trust root.
            builder = builder
                .tls_built_in_root_certs(false)
                .add_root_certificate(cert);
        }

        let client = builder.build().map_err(ClientBuildError::Build)?;

        Ok(Self {
            client,
            base_url,
            service_key,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// URL addressing an object in the KV store. Leading slashes on the key
    /// are stripped so the key can never rewrite the path root.
    fn object_url(&self, object_key: &str) -> String {
        let key = object_key.trim_start_matches('/');
        format!(
            "{}/kv/{}",
            self.base_url.as_str().trim_end_matches('/'),
            key
        )
    }

    /// Fetch an object from the KV store.
    ///
    /// Resolves as soon as response headers arrive; the body remains a byte
    /// stream on the returned response. The configured timeout bounds only
    /// this headers phase.
    pub async fn fetch(&self, object_key: &str) -> Result<reqwest::Response, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(X_SERVICE_KEY, self.service_key.clone());
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let request = self
            .client
            .get(self.object_url(object_key))
            .headers(headers);

        match tokio::time::timeout(self.timeout, request.send()).await {
            Err(_) => Err(TransportError::Timeout),
            Ok(Err(e)) if e.is_timeout() => Err(TransportError::Timeout),
            Ok(Err(e)) => Err(TransportError::ConnectionFailed(e)),
            Ok(Ok(response)) => Ok(response),
        }
    }
}
