//! End-to-end tests driving the router against the in-memory store

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::{json, Value};

use imgbed_server::app;
use imgbed_server::config::Config;
use imgbed_server::state::AppState;
use imgbed_server::storage::{MemoryStore, ObjectStore, PutOptions};

const TOKEN: &str = "s3cret";
const BOUNDARY: &str = "imgbed-test-boundary";

struct TestApp {
    server: TestServer,
    store: Arc<MemoryStore>,
}

impl TestApp {
    fn new(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let server = TestServer::new(app(AppState::new(config, store.clone()))).unwrap();
        Self { server, store }
    }

    fn with_token() -> Self {
        Self::new(Config::with_token(TOKEN))
    }

    async fn seed(&self, key: &str, data: &'static [u8]) {
        self.store
            .put(
                key,
                Bytes::from_static(data),
                PutOptions {
                    content_type: Some("image/png".to_string()),
                },
            )
            .await
            .unwrap();
    }
}

fn authorized(request: TestRequest, token: &'static str) -> TestRequest {
    request.add_header(header::AUTHORIZATION, HeaderValue::from_static(token))
}

fn with_header(request: TestRequest, name: HeaderName, value: &str) -> TestRequest {
    request.add_header(name, HeaderValue::from_str(value).unwrap())
}

fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Bytes {
    let mut body = Vec::new();
    for (filename, content_type, data) in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Bytes::from(body)
}

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_rejected_before_listing() {
    let app = TestApp::with_token();
    let response = app.server.post("/rest/list").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 401);
    assert_eq!(body["msg"], "not authenticated");
}

#[tokio::test]
async fn test_wrong_token_is_rejected() {
    let app = TestApp::with_token();
    let response = authorized(app.server.post("/rest/folder"), "nope")
        .json(&json!({"name": "abc"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], 403);
    assert_eq!(body["msg"], "auth fail");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_empty_token_is_not_authenticated() {
    let app = TestApp::with_token();
    let response = authorized(app.server.post("/rest/list"), "")
        .json(&json!({}))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["msg"], "not authenticated");
}

#[tokio::test]
async fn test_huge_page_number_returns_empty_page() {
    let app = TestApp::with_token();
    app.seed("a.png", b"x").await;

    let response = authorized(app.server.post("/rest/list"), TOKEN)
        .json(&json!({"limit": 100, "page": 9_000_000_000_000_000_000u64}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["list"], json!([]));
    assert_eq!(body["data"]["totalItems"], 1);
    assert_eq!(body["data"]["currentPage"], 9_000_000_000_000_000_000u64);
}

#[tokio::test]
async fn test_unconfigured_secret_is_reported() {
    let app = TestApp::new(Config::default());
    let response = authorized(app.server.post("/rest/folder"), TOKEN)
        .json(&json!({"name": "abc"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["msg"], "system not auth setting");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_reads_bypass_the_gate() {
    let app = TestApp::with_token();
    app.seed("open.png", b"png").await;

    let response = app.server.get("/rest/open.png").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(&response.as_bytes()[..], b"png");
}

#[tokio::test]
async fn test_check_token() {
    let app = TestApp::with_token();

    let response = app
        .server
        .post("/rest/checkToken")
        .json(&json!({"token": TOKEN}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"], true);

    let response = app
        .server
        .post("/rest/checkToken")
        .json(&json!({"token": "x"}))
        .await;
    assert_eq!(response.json::<Value>()["data"], false);

    let response = app.server.post("/rest/checkToken").json(&json!({})).await;
    assert_eq!(response.json::<Value>()["data"], false);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_third_page() {
    let app = TestApp::with_token();
    for i in 0..23 {
        let key = format!("{:03}.png", i);
        app.store
            .put(&key, Bytes::from_static(b"x"), PutOptions::default())
            .await
            .unwrap();
    }

    let response = authorized(app.server.post("/rest/list"), TOKEN)
        .json(&json!({"limit": 10, "page": 3}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let data = &body["data"];
    assert_eq!(data["totalItems"], 23);
    assert_eq!(data["totalPages"], 3);
    assert_eq!(data["currentPage"], 3);
    assert_eq!(data["next"], false);
    let keys: Vec<_> = data["list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["key"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(keys, vec!["020.png", "021.png", "022.png"]);
    assert_eq!(data["list"][0]["url"], "/rest/020.png");
}

#[tokio::test]
async fn test_list_rejects_malformed_body() {
    let app = TestApp::with_token();
    let response = authorized(app.server.post("/rest/list"), TOKEN)
        .content_type("application/json")
        .bytes(Bytes::from_static(b"{not json"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], false);
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn test_upload_mixed_batch() {
    let app = TestApp::with_token();
    let body = multipart_body(&[
        ("cat.png", "image/png", &b"\x89PNG fake"[..]),
        ("notes.txt", "text/plain", &b"hello"[..]),
    ]);

    let response = authorized(app.server.post("/rest/upload"), TOKEN)
        .content_type(&format!("multipart/form-data; boundary={BOUNDARY}"))
        .bytes(body)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let data = &body["data"];
    assert_eq!(data["errs"], "text/plain not support.");
    assert_eq!(data["list"].as_array().unwrap().len(), 1);
    assert_eq!(data["list"][0]["filename"], "cat.png");
    let key = data["list"][0]["key"].as_str().unwrap();
    assert!(key.ends_with(".png"));
    assert!(app.store.contains(key).await);
    assert_eq!(app.store.len().await, 1);
}

// ============================================================================
// Folders and deletion
// ============================================================================

#[tokio::test]
async fn test_folder_name_validation() {
    let app = TestApp::with_token();

    let response = authorized(app.server.post("/rest/folder"), TOKEN)
        .json(&json!({"name": "abc"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["success"], true);
    assert!(app.store.contains("abc/").await);

    let response = authorized(app.server.post("/rest/folder"), TOKEN)
        .json(&json!({"name": "ab1"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["msg"], "Folder name error");
    assert!(!app.store.contains("ab1/").await);
}

#[tokio::test]
async fn test_bulk_delete_skips_empty_keys() {
    let app = TestApp::with_token();
    for key in ["a", "b", "c"] {
        app.seed(key, b"x").await;
    }

    let response = authorized(app.server.delete("/rest"), TOKEN)
        .json(&json!({"keys": "a,,b"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"], "a,,b");
    assert!(!app.store.contains("a").await);
    assert!(!app.store.contains("b").await);
    assert!(app.store.contains("c").await);
}

#[tokio::test]
async fn test_bulk_delete_with_trailing_slash() {
    let app = TestApp::with_token();
    app.seed("a", b"x").await;

    let response = authorized(app.server.delete("/rest/"), TOKEN)
        .json(&json!({"keys": "a"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"], "a");
    assert!(app.store.is_empty().await);

    // Still guarded
    app.seed("b", b"x").await;
    let response = app.server.delete("/rest/").json(&json!({"keys": "b"})).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(app.store.contains("b").await);
}

#[tokio::test]
async fn test_bulk_delete_requires_keys() {
    let app = TestApp::with_token();
    let response = authorized(app.server.delete("/rest"), TOKEN)
        .json(&json!({"keys": ""}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["msg"], "not delete keys");
}

#[tokio::test]
async fn test_single_delete_echoes_key() {
    let app = TestApp::with_token();
    app.seed("cats/1.png", b"x").await;

    let response = app.server.get("/rest/del/cats/1.png").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"], "cats/1.png");
    assert!(app.store.is_empty().await);
}

// ============================================================================
// Retrieval
// ============================================================================

#[tokio::test]
async fn test_range_retrieval() {
    let app = TestApp::with_token();
    app.seed("cats/1.png", b"0123456789abcdef").await;

    let response = with_header(app.server.get("/rest/cats/1.png"), header::RANGE, "bytes=2-5").await;

    assert_eq!(response.status_code(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.header(header::CONTENT_RANGE), "bytes 2-5/16");
    assert_eq!(response.header(header::CONTENT_TYPE), "image/png");
    assert_eq!(&response.as_bytes()[..], b"2345");
}

#[tokio::test]
async fn test_conditional_retrieval() {
    let app = TestApp::with_token();
    app.seed("a.png", b"abc").await;

    let etag = app.server.get("/rest/a.png").await.header(header::ETAG);
    let etag = etag.to_str().unwrap();

    let response = with_header(app.server.get("/rest/a.png"), header::IF_NONE_MATCH, etag).await;

    assert_eq!(response.status_code(), StatusCode::NOT_MODIFIED);
    assert!(response.as_bytes().is_empty());
    assert!(response.headers().get(header::CONTENT_RANGE).is_none());
}

#[tokio::test]
async fn test_missing_object() {
    let app = TestApp::with_token();
    let response = app.server.get("/rest/nope.png").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["msg"], "object not found");
}

// ============================================================================
// Health and UI
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::with_token();
    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "imgbed-server");
}

#[tokio::test]
async fn test_ui_history_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>imgbed</html>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();

    let mut config = Config::with_token(TOKEN);
    config.server.ui_dir = Some(dir.path().to_path_buf());
    let app = TestApp::new(config);

    let response = app.server.get("/up").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "<html>imgbed</html>");

    let response = app.server.get("/app.js").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "console.log(1)");
}
