//! End-to-end tests for the playlist and segment proxy flows.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use streamnode::{EdgeConfig, HttpServer, Shutdown};
use tokio::net::TcpListener;

mod common;
use common::{start_mock_origin, OriginResponse};

const SERVICE_KEY: &str = "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeffff";
const ALLOWED_ORIGIN: &str = "https://player.example.com";

fn test_config(origin_addr: SocketAddr) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.upstream.base_url = format!("http://{origin_addr}");
    config.upstream.service_key = SERVICE_KEY.to_string();
    config.upstream.timeout_secs = 1;
    config.access.allowed_origin = ALLOWED_ORIGIN.to_string();
    config
}

async fn start_proxy(config: EdgeConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Let the acceptor come up before hitting it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn playlist_happy_path_overrides_content_type_and_caches_briefly() {
    let playlist = "#EXTM3U\n#EXT-X-VERSION:3\nseg1.ts\n";
    let origin = start_mock_origin(move |head| async move {
        assert!(head.starts_with("GET /kv/index.m3u8"));
        assert!(head.to_ascii_lowercase().contains("x-service-key"));
        OriginResponse::ok(playlist.as_bytes()).with_header("content-type", "text/plain")
    })
    .await;
    let (proxy, shutdown) = start_proxy(test_config(origin)).await;

    let res = client()
        .get(format!("http://{proxy}/m3u8/index.m3u8"))
        .header("origin", ALLOWED_ORIGIN)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/vnd.apple.mpegurl"
    );
    assert_eq!(
        res.headers().get("cache-control").unwrap(),
        "public, max-age=5"
    );
    assert_eq!(res.text().await.unwrap(), playlist);

    shutdown.trigger();
}

#[tokio::test]
async fn segment_relays_body_and_strips_unlisted_headers() {
    let segment: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
    let body = segment.clone();
    let origin = start_mock_origin(move |_| {
        let body = body.clone();
        async move {
            OriginResponse::ok(&body)
                .with_header("content-type", "video/mp2t")
                .with_header("x-cache", "HIT")
                .with_header("set-cookie", "session=abc")
                .with_header("server", "pipekv/2.1")
        }
    })
    .await;
    let (proxy, shutdown) = start_proxy(test_config(origin)).await;

    let res = client()
        .get(format!("http://{proxy}/ts/seg1.ts"))
        .header("referer", format!("{ALLOWED_ORIGIN}/watch/123"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("content-type").unwrap(), "video/mp2t");
    assert_eq!(res.headers().get("x-cache").unwrap(), "HIT");
    assert!(res.headers().get("set-cookie").is_none());
    assert!(res.headers().get("server").is_none());
    assert_eq!(res.bytes().await.unwrap().as_ref(), segment.as_slice());

    shutdown.trigger();
}

#[tokio::test]
async fn segment_without_content_type_defaults_to_mpeg_ts() {
    let origin = start_mock_origin(|_| async {
        OriginResponse::ok(b"tsdata").with_header("x-kv-version", "7")
    })
    .await;
    let (proxy, shutdown) = start_proxy(test_config(origin)).await;

    let res = client()
        .get(format!("http://{proxy}/ts/seg1.ts"))
        .header("origin", ALLOWED_ORIGIN)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("content-type").unwrap(), "video/mp2t");
    assert_eq!(res.headers().get("x-kv-version").unwrap(), "7");

    shutdown.trigger();
}

#[tokio::test]
async fn missing_origin_and_referer_is_rejected_without_upstream_call() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let origin = start_mock_origin(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { OriginResponse::ok(b"should never be served") }
    })
    .await;
    let (proxy, shutdown) = start_proxy(test_config(origin)).await;

    let res = client()
        .get(format!("http://{proxy}/ts/seg1.ts"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 403);
    assert_eq!(calls.load(Ordering::SeqCst), 0, "origin must not be called");

    shutdown.trigger();
}

#[tokio::test]
async fn path_traversal_is_rejected_without_upstream_call() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let origin = start_mock_origin(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { OriginResponse::ok(b"should never be served") }
    })
    .await;
    let (proxy, shutdown) = start_proxy(test_config(origin)).await;

    // Encoded separators decode to ../../etc/passwd.m3u8 inside the
    // filename segment.
    let res = client()
        .get(format!(
            "http://{proxy}/m3u8/..%2F..%2Fetc%2Fpasswd.m3u8"
        ))
        .header("origin", ALLOWED_ORIGIN)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 403);
    assert_eq!(calls.load(Ordering::SeqCst), 0, "origin must not be called");

    shutdown.trigger();
}

#[tokio::test]
async fn upstream_non_200_status_passes_through_with_generic_body() {
    let origin = start_mock_origin(|_| async {
        OriginResponse {
            status: 404,
            headers: Vec::new(),
            body: b"internal bucket path /kv/x was not found".to_vec(),
        }
    })
    .await;
    let (proxy, shutdown) = start_proxy(test_config(origin)).await;

    let res = client()
        .get(format!("http://{proxy}/m3u8/missing.m3u8"))
        .header("origin", ALLOWED_ORIGIN)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    let body = res.text().await.unwrap();
    assert_eq!(body, "Not found");

    shutdown.trigger();
}

#[tokio::test]
async fn slow_origin_headers_phase_maps_to_504() {
    let origin = start_mock_origin(|_| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        OriginResponse::ok(b"too late")
    })
    .await;
    let (proxy, shutdown) = start_proxy(test_config(origin)).await;

    let res = client()
        .get(format!("http://{proxy}/ts/seg1.ts"))
        .header("origin", ALLOWED_ORIGIN)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 504);
    assert_eq!(res.text().await.unwrap(), "Upstream timeout");

    shutdown.trigger();
}

#[tokio::test]
async fn unreachable_origin_maps_to_502() {
    // Bind then drop to get a port with nothing listening.
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let (proxy, shutdown) = start_proxy(test_config(dead_addr)).await;

    let res = client()
        .get(format!("http://{proxy}/m3u8/index.m3u8"))
        .header("origin", ALLOWED_ORIGIN)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    assert_eq!(res.text().await.unwrap(), "Upstream unreachable");

    shutdown.trigger();
}

#[tokio::test]
async fn health_endpoint_needs_no_origin_header() {
    let origin = start_mock_origin(|_| async { OriginResponse::ok(b"") }).await;
    let (proxy, shutdown) = start_proxy(test_config(origin)).await;

    let res = client()
        .get(format!("http://{proxy}/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "OK");

    shutdown.trigger();
}

#[tokio::test]
async fn wrong_extension_for_route_is_rejected() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let origin = start_mock_origin(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { OriginResponse::ok(b"nope") }
    })
    .await;
    let (proxy, shutdown) = start_proxy(test_config(origin)).await;

    let res = client()
        .get(format!("http://{proxy}/m3u8/seg1.ts"))
        .header("origin", ALLOWED_ORIGIN)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 403);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    shutdown.trigger();
}
