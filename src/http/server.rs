//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the media and liveness routes
//! - Wire up middleware (request ID, tracing, CORS)
//! - Construct the shared upstream client
//! - Serve with graceful shutdown

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::{AccessConfig, EdgeConfig};
use crate::http::handlers::{
    health_check, serve_playlist, serve_segment, version_check, AppState,
};
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::upstream::{ClientBuildError, OriginClient};

/// HTTP server for the edge node.
pub struct HttpServer {
    router: Router,
    config: EdgeConfig,
}

impl HttpServer {
    /// Create a new HTTP server from validated configuration.
    pub fn new(config: EdgeConfig) -> Result<Self, ClientBuildError> {
        let origin = OriginClient::new(&config.upstream)?;
        let state = AppState {
            config: Arc::new(config.clone()),
            origin: Arc::new(origin),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &EdgeConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/version", get(version_check))
            .route("/m3u8/{filename}", get(serve_playlist))
            .route("/ts/{filename}", get(serve_segment))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(Self::cors_layer(&config.access)),
            )
    }

    /// CORS: one exact allowed origin, credentials allowed. Mirrored request
    /// headers instead of a wildcard, which credentials mode forbids.
    fn cors_layer(access: &AccessConfig) -> CorsLayer {
        let mut cors = CorsLayer::new()
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
            .allow_headers(AllowHeaders::mirror_request());

        // Validation guarantees the configured origin parses; an unparseable
        // origin here just means no CORS origin is advertised.
        if let Ok(origin) = access.allowed_origin.parse::<HeaderValue>() {
            cors = cors.allow_origin(origin);
        }
        cors
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = shutdown.recv() => {}
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EdgeConfig {
        let mut config = EdgeConfig::default();
        config.upstream.base_url = "https://203.0.113.10".to_string();
        config.upstream.service_key = "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeffff".to_string();
        config.access.allowed_origin = "https://player.example.com".to_string();
        config
    }

    #[test]
    fn builds_server_from_valid_config() {
        let server = HttpServer::new(test_config()).unwrap();
        assert_eq!(
            server.config().access.allowed_origin,
            "https://player.example.com"
        );
    }

    #[tokio::test]
    async fn cors_preflight_reflects_configured_origin() {
        use axum::body::Body;
        use axum::http::{header, Request, StatusCode};
        use tower::util::ServiceExt;

        let server = HttpServer::new(test_config()).unwrap();
        let app = server.router;

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/m3u8/index.m3u8")
            .header(header::ORIGIN, "https://player.example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://player.example.com"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }
}
