//! Repository Pipeline Integration Tests
//!
//! Drives the full application against a mock GitHub API: pagination, fork
//! filtering, ranking, caching and the failure paths of `GET /app`.

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use portfolio::{configure_app, handlers, AppState, CacheBackend, Config};

// ============================================================================
// Test Helpers
// ============================================================================

fn config_for(server: &ServerGuard) -> Config {
    Config {
        github_username: "someone".to_string(),
        github_api_base: server.url(),
        github_api_timeout_secs: 5.0,
        ..Config::default()
    }
}

macro_rules! init_app {
    ($config:expr) => {{
        let state = web::Data::new(AppState::from_config($config).expect("state builds"));
        test::init_service(
            App::new()
                .app_data(state)
                .configure(configure_app)
                .default_service(web::to(handlers::not_found)),
        )
        .await
    }};
}

/// GET /app, returning `(status, X-Cache header, body)`
macro_rules! get_app_page {
    ($app:expr) => {{
        let resp = test::call_service($app, test::TestRequest::get().uri("/app").to_request()).await;
        let status = resp.status();
        let cache = resp
            .headers()
            .get("X-Cache")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).expect("utf-8 body");
        (status, cache, body)
    }};
}

fn repo_json(name: &str, stars: u64, fork: bool) -> serde_json::Value {
    json!({
        "name": name,
        "html_url": format!("https://github.com/someone/{name}"),
        "clone_url": format!("https://github.com/someone/{name}.git"),
        "language": "Rust",
        "stargazers_count": stars,
        "forks": 0,
        "description": format!("{name} description"),
        "fork": fork,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[actix_rt::test]
async fn test_paginated_listing_is_filtered_ranked_and_cached() {
    let mut server = Server::new_async().await;
    let next = format!("<{}/users/someone/repos?sort=pushed&page=2>; rel=\"next\"", server.url());

    let first_page = server
        .mock("GET", "/users/someone/repos")
        .match_query(Matcher::Exact("sort=pushed".to_string()))
        .with_header("content-type", "application/json")
        .with_header("link", &next)
        .with_body(
            json!([repo_json("ten-star-repo", 10, false), repo_json("forked-repo", 999, true)])
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let second_page = server
        .mock("GET", "/users/someone/repos")
        .match_query(Matcher::Exact("sort=pushed&page=2".to_string()))
        .with_header("content-type", "application/json")
        .with_body(json!([repo_json("fifteen-star-repo", 15, false)]).to_string())
        .expect(1)
        .create_async()
        .await;

    let app = init_app!(config_for(&server));

    let (status, cache, body) = get_app_page!(&app);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some("miss"));
    assert!(!body.contains("forked-repo"), "Forks must be filtered out");
    let fifteen = body.find("fifteen-star-repo").expect("page 2 repo rendered");
    let ten = body.find("ten-star-repo").expect("page 1 repo rendered");
    assert!(fifteen < ten);

    // Served from cache: GitHub is not contacted again.
    let (status, cache, _) = get_app_page!(&app);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some("hit"));

    first_page.assert_async().await;
    second_page.assert_async().await;
}

#[actix_rt::test]
async fn test_upstream_error_yields_503_page() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/users/someone/repos")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(2)
        .create_async()
        .await;

    let app = init_app!(config_for(&server));

    // A failure is not cached: the next view tries again.
    for _ in 0..2 {
        let (status, _, body) = get_app_page!(&app);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("Unable to fetch repository data at this time"));
    }

    mock.assert_async().await;
}

#[actix_rt::test]
async fn test_token_is_sent_when_configured() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/users/someone/repos")
        .match_query(Matcher::Any)
        .match_header("authorization", "token secret-token")
        .with_header("content-type", "application/json")
        .with_body(json!([repo_json("private-ish", 1, false)]).to_string())
        .create_async()
        .await;

    let app = init_app!(Config {
        github_token: Some("secret-token".to_string()),
        ..config_for(&server)
    });

    let (status, _, body) = get_app_page!(&app);
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("private-ish"));

    mock.assert_async().await;
}

#[actix_rt::test]
async fn test_unreachable_redis_falls_back_to_direct_fetch() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/users/someone/repos")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(json!([repo_json("still-served", 4, false)]).to_string())
        .expect(2)
        .create_async()
        .await;

    let app = init_app!(Config {
        cache_backend: CacheBackend::Redis,
        redis_url: "redis://127.0.0.1:1/0".to_string(),
        ..config_for(&server)
    });

    // Every view bypasses the cache while Redis is down.
    for _ in 0..2 {
        let (status, cache, body) = get_app_page!(&app);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("bypassed"));
        assert!(body.contains("still-served"));
    }

    mock.assert_async().await;
}
