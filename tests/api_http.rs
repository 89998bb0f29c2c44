// tests/api_http.rs
//
// HTTP-level tests for the public Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, with a
// FixtureFetcher standing in for the network.
//
// Covered:
// - GET /
// - GET /{category} (+ limit handling)
// - unknown category, invalid limit, upstream failure
// - CORS

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use newsfeed_aggregator::config::AppConfig;
use newsfeed_aggregator::feed::FixtureFetcher;
use newsfeed_aggregator::{router, AppState};

const BODY_LIMIT: usize = 4 * 1024 * 1024;
const WIRED: &str = include_str!("fixtures/wired_rss.xml");

/// Every source of every category answers with the same Wired fixture.
fn test_router() -> Router {
    test_router_with(FixtureFetcher::new().with_fallback(WIRED), AppConfig::default())
}

fn test_router_with(fetcher: FixtureFetcher, cfg: AppConfig) -> Router {
    router(AppState::with_fetcher(Arc::new(fetcher), cfg))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let res = app.oneshot(req).await.expect("oneshot");
    let status = res.status();
    let bytes = body::to_bytes(res.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, json)
}

#[tokio::test]
async fn root_reports_api_up() {
    let (status, v) = get(test_router(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, serde_json::json!({ "message": "API is up!" }));
}

#[tokio::test]
async fn category_returns_default_limit_of_items() {
    let (status, v) = get(test_router(), "/technology").await;
    assert_eq!(status, StatusCode::OK);

    let arr = v.as_array().expect("array body");
    assert_eq!(arr.len(), 10);
    for it in arr {
        let obj = it.as_object().expect("item object");
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["category", "description", "link", "pubdate", "thumbnail_url", "title"]
        );
        assert_eq!(obj["category"], "technology");
    }
    // newest wired story leads
    assert_eq!(arr[0]["title"], "The Robots Are Learning to Fold Laundry");
    assert_eq!(arr[0]["pubdate"], "2024-01-17T12:00:00+00:00");
}

#[tokio::test]
async fn limit_is_respected_and_clamped() {
    let (_, two) = get(test_router(), "/sports?limit=2").await;
    assert_eq!(two.as_array().map(Vec::len), Some(2));

    let (status, none) = get(test_router(), "/sports?limit=-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none, serde_json::json!([]));

    let cfg = AppConfig {
        max_limit: 4,
        ..AppConfig::default()
    };
    let app = test_router_with(FixtureFetcher::new().with_fallback(WIRED), cfg);
    let (_, clamped) = get(app, "/business?limit=500").await;
    assert_eq!(clamped.as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn every_category_route_exists() {
    for c in ["technology", "sports", "business", "science", "health", "entertainment"] {
        let (status, v) = get(test_router(), &format!("/{c}?limit=1")).await;
        assert_eq!(status, StatusCode::OK, "GET /{c}");
        assert_eq!(v[0]["category"], c);
    }
}

#[tokio::test]
async fn unknown_category_is_404() {
    let (status, v) = get(test_router(), "/politics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["detail"], "Not Found");

    // category names are case-sensitive
    let (status, _) = get(test_router(), "/Technology").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_integer_limit_is_rejected() {
    let (status, _) = get(test_router(), "/science?limit=ten").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dead_sources_give_empty_list_when_isolated() {
    let app = test_router_with(FixtureFetcher::new(), AppConfig::default());
    let (status, v) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, serde_json::json!([]));
}

#[tokio::test]
async fn dead_sources_give_502_without_isolation() {
    let cfg = AppConfig {
        isolate_failures: false,
        ..AppConfig::default()
    };
    let app = test_router_with(FixtureFetcher::new(), cfg);
    let (status, v) = get(app, "/health").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(v["detail"].as_str().unwrap_or_default().contains("404"));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let req = Request::builder()
        .method("GET")
        .uri("/")
        .header(header::ORIGIN, "https://frontend.example")
        .body(Body::empty())
        .unwrap();
    let res = test_router().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://frontend.example")
    );
}
