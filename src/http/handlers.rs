//! Request handlers for the playlist and segment routes.
//!
//! Each request runs the same pipeline: path validation, origin check,
//! upstream fetch, then response shaping. All failure mapping to HTTP
//! statuses happens here and nowhere else; bodies are fixed strings that
//! never leak upstream error detail.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::config::EdgeConfig;
use crate::observability::metrics;
use crate::security::{access, headers, path, RejectReason};
use crate::upstream::{OriginClient, TransportError};

/// Content type for playlist responses, always overriding upstream.
const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Fallback content type for segments when upstream does not declare one.
const MPEG_TS_CONTENT_TYPE: &str = "video/mp2t";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EdgeConfig>,
    pub origin: Arc<OriginClient>,
}

/// Route type; decides the extension set and response shaping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Playlist,
    Segment,
}

impl AssetKind {
    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            AssetKind::Playlist => &[".m3u8"],
            AssetKind::Segment => &[".ts"],
        }
    }

    fn route_label(self) -> &'static str {
        match self {
            AssetKind::Playlist => "/m3u8",
            AssetKind::Segment => "/ts",
        }
    }
}

/// Everything that can stop a request before a 200 relay.
#[derive(Debug)]
enum ProxyError {
    Rejected(RejectReason),
    Transport(TransportError),
    UpstreamStatus(StatusCode),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ProxyError::Rejected(RejectReason::PathUnsafe) => (StatusCode::FORBIDDEN, "Forbidden"),
            ProxyError::Rejected(RejectReason::OriginBlocked) => {
                (StatusCode::FORBIDDEN, "Origin blocked")
            }
            // Upstream body is never forwarded on non-200.
            ProxyError::UpstreamStatus(status) => (status, "Not found"),
            ProxyError::Transport(TransportError::Timeout) => {
                (StatusCode::GATEWAY_TIMEOUT, "Upstream timeout")
            }
            ProxyError::Transport(TransportError::ConnectionFailed(_)) => {
                (StatusCode::BAD_GATEWAY, "Upstream unreachable")
            }
        };
        (status, body).into_response()
    }
}

/// Health check endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Version endpoint.
pub async fn version_check() -> &'static str {
    concat!("streamnode v", env!("CARGO_PKG_VERSION"))
}

/// Playlist endpoint.
/// GET /m3u8/{filename}
pub async fn serve_playlist(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    request_headers: HeaderMap,
) -> Response {
    serve(state, filename, request_headers, AssetKind::Playlist).await
}

/// Segment endpoint.
/// GET /ts/{filename}
pub async fn serve_segment(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    request_headers: HeaderMap,
) -> Response {
    serve(state, filename, request_headers, AssetKind::Segment).await
}

async fn serve(
    state: AppState,
    filename: String,
    request_headers: HeaderMap,
    kind: AssetKind,
) -> Response {
    let start = Instant::now();
    let request_id = header_str(&request_headers, "x-request-id").to_string();

    let response = match relay(&state, &filename, &request_headers, kind).await {
        Ok(response) => response,
        Err(err) => {
            match &err {
                ProxyError::Rejected(reason) => {
                    tracing::warn!(request_id = %request_id, filename = %filename, reason = %reason, "Request rejected");
                }
                ProxyError::UpstreamStatus(status) => {
                    tracing::debug!(request_id = %request_id, filename = %filename, status = %status, "Upstream non-200 passed through");
                }
                ProxyError::Transport(transport) => {
                    tracing::error!(request_id = %request_id, filename = %filename, error = %transport, "Upstream transport failure");
                }
            }
            err.into_response()
        }
    };

    metrics::record_request(kind.route_label(), response.status().as_u16(), start);
    response
}

/// The RECEIVED → VALIDATING → AUTHORIZING → FETCHING → RESPONDING pipeline.
async fn relay(
    state: &AppState,
    filename: &str,
    request_headers: &HeaderMap,
    kind: AssetKind,
) -> Result<Response, ProxyError> {
    let access_config = &state.config.access;

    path::validate(
        filename,
        kind.allowed_extensions(),
        access_config.case_sensitive_extensions,
    )
    .map_err(ProxyError::Rejected)?;

    access::authorize(
        header_str(request_headers, header::ORIGIN.as_str()),
        header_str(request_headers, header::REFERER.as_str()),
        &access_config.allowed_origin,
        access_config.match_strategy,
    )
    .map_err(ProxyError::Rejected)?;

    let upstream = state
        .origin
        .fetch(filename)
        .await
        .map_err(ProxyError::Transport)?;

    if upstream.status() != StatusCode::OK {
        return Err(ProxyError::UpstreamStatus(upstream.status()));
    }

    match kind {
        AssetKind::Playlist => playlist_response(state, upstream).await,
        AssetKind::Segment => Ok(segment_response(upstream)),
    }
}

/// Playlists are small bounded text; buffer fully and emit with the HLS
/// content type and a short public cache window.
async fn playlist_response(
    state: &AppState,
    upstream: reqwest::Response,
) -> Result<Response, ProxyError> {
    let body: Bytes = upstream
        .bytes()
        .await
        .map_err(|e| ProxyError::Transport(TransportError::ConnectionFailed(e)))?;

    let mut response = Body::from(body).into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(PLAYLIST_CONTENT_TYPE),
    );
    let cache_control = format!(
        "public, max-age={}",
        state.config.playlist.cache_max_age_secs
    );
    if let Ok(value) = HeaderValue::from_str(&cache_control) {
        response_headers.insert(header::CACHE_CONTROL, value);
    }
    Ok(response)
}

/// Segments are relayed as a live byte stream; the body is never fully
/// materialized. Dropping the response (client disconnect) drops the
/// underlying upstream connection with it.
fn segment_response(upstream: reqwest::Response) -> Response {
    let mut filtered = headers::filter(upstream.headers());
    if !filtered.contains_key(header::CONTENT_TYPE) {
        filtered.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(MPEG_TS_CONTENT_TYPE),
        );
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.headers_mut() = filtered;
    response
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
