// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use ipo_relay_server::{app, bind, AppState, Config, MemoryStore};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const KEY: &str = "ipo_list";

fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = Config {
        store_timeout_ms: 100,
        ..Config::default()
    };
    let router = app(AppState::new(store.clone(), config));
    (router, store)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, header::HeaderMap, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

#[tokio::test]
async fn test_populated_key_is_relayed() {
    let (router, store) = test_app();
    store.set(KEY, r#"{"items":[1,2,3]}"#);

    let (status, headers, body) = send(&router, get("/api/ipos")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(body, br#"{"items":[1,2,3]}"#);
}

#[tokio::test]
async fn test_passthrough_is_byte_exact() {
    let (router, store) = test_app();

    let payloads: [&[u8]; 5] = [
        b"  [ {\"company_name\": \"Alpha Hydro\", \"share_type\": \"IPO\"} ]\n",
        b"{\"b\":2,\"a\":1}",
        "[\"Nepal \u{0928}\u{0947}\u{092a}\u{093e}\u{0932}\"]".as_bytes(),
        b"not json at all",
        b"",
    ];

    for payload in payloads {
        store.set(KEY, payload.to_vec());
        let (status, headers, body) = send(&router, get("/api/ipos")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(body, payload);
    }
}

#[tokio::test]
async fn test_missing_key_reports_syncing() {
    let (router, _store) = test_app();

    for _ in 0..5 {
        let (status, headers, body) = send(&router, get("/api/ipos")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(
            body,
            br#"{"message":"Data syncing, please try again in a moment."}"#
        );
    }
}

#[tokio::test]
async fn test_broken_store_reports_error_and_keeps_serving() {
    let (router, store) = test_app();
    store.set(KEY, "[]");
    store.set_broken(true);

    for _ in 0..3 {
        let (status, _, body) = send(&router, get("/api/ipos")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Redis error");
    }

    // Same router keeps working once the store comes back
    store.set_broken(false);
    let (status, _, body) = send(&router, get("/api/ipos")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"[]");
}

#[tokio::test]
async fn test_slow_store_is_treated_as_unavailable() {
    let (router, store) = test_app();
    store.set(KEY, "[]");
    store.set_delay(Some(Duration::from_secs(5)));

    let started = std::time::Instant::now();
    let (status, _, body) = send(&router, get("/api/ipos")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(started.elapsed() < Duration::from_secs(2));
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Redis error");
}

#[tokio::test]
async fn test_configured_key_is_used() {
    let store = Arc::new(MemoryStore::new());
    store.set(KEY, "old");
    store.set("ipo_list_v2", "new");
    let config = Config {
        cache_key: "ipo_list_v2".into(),
        ..Config::default()
    };
    let router = app(AppState::new(store, config));

    let (status, _, body) = send(&router, get("/api/ipos")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"new");
}

#[tokio::test]
async fn test_any_origin_is_allowed() {
    let (router, store) = test_app();
    store.set(KEY, "[]");

    for uri in ["/api/ipos", "/api/health"] {
        let request = Request::builder()
            .uri(uri)
            .header(header::ORIGIN, "https://some-frontend.example")
            .body(Body::empty())
            .unwrap();
        let (_, headers, _) = send(&router, request).await;
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    // Error responses carry the header too
    store.remove(KEY);
    let request = Request::builder()
        .uri("/api/ipos")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_cors_preflight() {
    let (router, _store) = test_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/ipos")
        .header(header::ORIGIN, "https://some-frontend.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_concurrent_requests_get_full_payload() {
    let (router, store) = test_app();
    let payload: String = format!(
        "[{}]",
        (0..2000)
            .map(|i| format!(r#"{{"id":{},"company_name":"Company {}"}}"#, i, i))
            .collect::<Vec<_>>()
            .join(",")
    );
    store.set(KEY, payload.clone());

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..100 {
        let router = router.clone();
        tasks.spawn(async move { send(&router, get("/api/ipos")).await });
    }

    let mut completed = 0;
    while let Some(result) = tasks.join_next().await {
        let (status, _, body) = result.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, payload.as_bytes());
        completed += 1;
    }
    assert_eq!(completed, 100);
}

#[tokio::test]
async fn test_health_reflects_store_state() {
    let (router, store) = test_app();

    let (status, _, body) = send(&router, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["store"], "reachable");

    store.set_broken(true);
    let (status, _, body) = send(&router, get("/api/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "unhealthy");
}

#[tokio::test]
async fn test_info_lists_endpoints() {
    let (router, _store) = test_app();

    let (status, _, body) = send(&router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let paths: Vec<&str> = json["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["path"].as_str())
        .collect();
    assert!(paths.contains(&"/api/ipos"));
}

#[tokio::test]
async fn test_only_get_is_routed() {
    let (router, store) = test_app();
    store.set(KEY, "[]");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/ipos")
        .body(Body::from("[1]"))
        .unwrap();
    let (status, _, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    // Nothing was written
    let (_, _, body) = send(&router, get("/api/ipos")).await;
    assert_eq!(body, b"[]");
}

#[tokio::test]
async fn test_request_timeout_returns_408() {
    let store = Arc::new(MemoryStore::new());
    store.set(KEY, "[]");
    store.set_delay(Some(Duration::from_secs(3)));
    let config = Config {
        request_timeout_secs: 1,
        store_timeout_ms: 10_000,
        ..Config::default()
    };
    let router = app(AppState::new(store, config));

    let (status, _, _) = send(&router, get("/api/ipos")).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_bind_accepts_host_names_and_literals() {
    for host in ["127.0.0.1", "localhost"] {
        let config = Config {
            host: host.into(),
            port: 0,
            ..Config::default()
        };
        let listener = bind(&config).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }
}

#[tokio::test]
async fn test_bind_accepts_ipv6_literal() {
    // Skip where the host has no IPv6 loopback.
    if std::net::TcpListener::bind("[::1]:0").is_err() {
        return;
    }

    let config = Config {
        host: "::1".into(),
        port: 0,
        ..Config::default()
    };
    let listener = bind(&config).await.unwrap();
    assert!(listener.local_addr().unwrap().is_ipv6());
}
