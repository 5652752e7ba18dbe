//! Tests for the HTTP client module

use super::*;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::session::{MemoryStore, RecordingNavigator, SessionContext};
use crate::types::{ACCESS_KEY, REFRESH_KEY, USER_KEY};
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

struct Harness {
    client: ApiClient,
    store: Arc<MemoryStore>,
    navigator: Arc<RecordingNavigator>,
}

fn harness(mock_server: &MockServer, entries: &[(&str, &str)]) -> Harness {
    harness_with(
        ClientConfig::builder()
            .base_url(format!("{}/api/", mock_server.uri()))
            .build(),
        entries,
    )
}

fn harness_with(config: ClientConfig, entries: &[(&str, &str)]) -> Harness {
    let store = Arc::new(MemoryStore::with_entries(entries.iter().copied()));
    let navigator = Arc::new(RecordingNavigator::new());
    let session = SessionContext::new(store.clone()).with_navigator(navigator.clone());
    let client = ApiClient::new(config, session).unwrap();
    Harness {
        client,
        store,
        navigator,
    }
}

async fn mount_refresh(mock_server: &MockServer, refresh: &str, access: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(serde_json::json!({ "refresh": refresh })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access": access
        })))
        .expect(times)
        .mount(mock_server)
        .await;
}

async fn refresh_calls(mock_server: &MockServer) -> usize {
    mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/token/refresh/")
        .count()
}

// ============================================================================
// Request Config / Descriptor Tests
// ============================================================================

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .query("page", "1")
        .header("X-Request-Id", "abc123")
        .json(serde_json::json!({"key": "value"}))
        .timeout(Duration::from_secs(10));

    assert_eq!(config.query.get("page"), Some(&"1".to_string()));
    assert_eq!(
        config.headers.get("X-Request-Id"),
        Some(&"abc123".to_string())
    );
    assert!(config.body.is_some());
    assert_eq!(config.timeout, Some(Duration::from_secs(10)));
}

#[test]
fn test_pending_request_retry_is_a_new_descriptor() {
    let client = ApiClient::new(ClientConfig::default(), SessionContext::in_memory()).unwrap();
    let original = client
        .prepare(
            Method::POST,
            "events/create/",
            RequestConfig::new().json(serde_json::json!({"title": "Gala"})),
        )
        .unwrap();

    let retry = original.retry();

    assert_eq!(original.attempt(), 0);
    assert!(!original.is_retry());
    assert_eq!(retry.attempt(), 1);
    assert!(retry.is_retry());
    assert_eq!(retry.url(), "http://127.0.0.1:8000/api/events/create/");
    assert_eq!(retry.method(), &Method::POST);
    assert_eq!(retry.body(), original.body());
}

#[test]
fn test_prepare_merges_headers() {
    let config = ClientConfig::builder().header("X-Client", "eventdesk").build();
    let client = ApiClient::new(config, SessionContext::in_memory()).unwrap();

    let pending = client
        .prepare(
            Method::GET,
            "events/",
            RequestConfig::new().header("X-Client", "override"),
        )
        .unwrap();

    assert_eq!(pending.headers().get("x-client").unwrap(), "override");
    assert_eq!(
        pending.headers().get("content-type").unwrap(),
        "application/json"
    );
}

#[test]
fn test_invalid_header_is_rejected() {
    let client = ApiClient::new(ClientConfig::default(), SessionContext::in_memory()).unwrap();
    let err = client
        .prepare(
            Method::GET,
            "events/",
            RequestConfig::new().header("bad header", "x"),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidHeader { .. }));
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = ClientConfig::builder().base_url("::nope::").build();
    assert!(ApiClient::new(config, SessionContext::in_memory()).is_err());
}

// ============================================================================
// Request Interception Tests
// ============================================================================

#[tokio::test]
async fn test_attaches_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &[(ACCESS_KEY, "A1")]);
    let response = h.client.get("events/").await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_no_token_sends_no_authorization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &[]);
    h.client
        .post("login/", serde_json::json!({"username": "a", "password": "b"}))
        .await
        .unwrap();

    let requests: Vec<Request> = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_stored_token_replaces_caller_authorization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/me/"))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &[(ACCESS_KEY, "A1")]);
    h.client
        .get_with_config(
            "me/",
            RequestConfig::new().header("Authorization", "Bearer caller"),
        )
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].headers.get_all("authorization").iter().count(), 1);
}

#[tokio::test]
async fn test_query_params_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(query_param("page", "2"))
        .and(header("X-Request-Id", "req-456"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &[]);
    let response = h
        .client
        .get_with_config(
            "events/",
            RequestConfig::new()
                .query("page", "2")
                .header("X-Request-Id", "req-456"),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_absolute_url_passes_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness_with(ClientConfig::default(), &[]);
    let response = h
        .client
        .get(&format!("{}/elsewhere", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_get_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "username": "alice",
            "is_admin": true
        })))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &[(ACCESS_KEY, "A1")]);
    let me: serde_json::Value = h.client.get_json("me/").await.unwrap();
    assert_eq!(me["is_admin"], true);
}

// ============================================================================
// Response Interception Tests
// ============================================================================

#[tokio::test]
async fn test_refresh_and_retry_with_new_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "code": "token_not_valid"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(header("Authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "title": "Launch"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_refresh(&mock_server, "R1", "A2", 1).await;

    let h = harness(&mock_server, &[(ACCESS_KEY, "A1"), (REFRESH_KEY, "R1")]);
    let events: serde_json::Value = h.client.get_json("events/").await.unwrap();

    assert_eq!(events[0]["title"], "Launch");
    let snapshot = h.store.snapshot().await;
    assert_eq!(snapshot.get(ACCESS_KEY), Some(&"A2".to_string()));
    assert_eq!(snapshot.get(REFRESH_KEY), Some(&"R1".to_string()));
    assert!(h.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_retry_preserves_method_and_body() {
    let mock_server = MockServer::start().await;
    let payload = serde_json::json!({"title": "Gala", "capacity": 50});

    Mock::given(method("POST"))
        .and(path("/api/events/create/"))
        .and(header("Authorization", "Bearer A1"))
        .and(body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/events/create/"))
        .and(header("Authorization", "Bearer A2"))
        .and(body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_refresh(&mock_server, "R1", "A2", 1).await;

    let h = harness(&mock_server, &[(ACCESS_KEY, "A1"), (REFRESH_KEY, "R1")]);
    let response = h.client.post("events/create/", payload).await.unwrap();
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn test_401_without_refresh_token_tears_down() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &[(ACCESS_KEY, "A1"), (USER_KEY, "{}")]);
    let err = h.client.get("events/").await.unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "expired");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(h.store.snapshot().await.is_empty());
    assert_eq!(h.navigator.routes(), vec!["/".to_string()]);
}

#[tokio::test]
async fn test_second_401_is_not_retried_again() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/dashboard/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&mock_server)
        .await;

    mount_refresh(&mock_server, "R1", "A2", 1).await;

    let h = harness(&mock_server, &[(ACCESS_KEY, "A1"), (REFRESH_KEY, "R1")]);
    let err = h.client.get("admin/dashboard/").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(refresh_calls(&mock_server).await, 1);
    // the refresh itself succeeded, so the session stays
    assert_eq!(
        h.store.snapshot().await.get(ACCESS_KEY),
        Some(&"A2".to_string())
    );
    assert!(h.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_refresh_failure_tears_down_and_propagates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/my-bookings/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "code": "token_not_valid"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &[(ACCESS_KEY, "A1"), (REFRESH_KEY, "R1")]);
    let err = h.client.get("my-bookings/").await.unwrap_err();

    assert!(matches!(
        err,
        Error::TokenRefresh {
            status: Some(401),
            ..
        }
    ));
    assert!(h.store.snapshot().await.is_empty());
    assert_eq!(h.navigator.routes(), vec!["/".to_string()]);
}

#[tokio::test]
async fn test_other_errors_propagate_without_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/bookings/"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Admin only"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &[(ACCESS_KEY, "A1"), (REFRESH_KEY, "R1")]);

    let err = h.client.get("admin/bookings/").await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.to_string(), "HTTP 403: Admin only");

    let err = h.client.get("events/").await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    assert_eq!(refresh_calls(&mock_server).await, 0);
    assert_eq!(h.store.snapshot().await.len(), 2);
}

#[tokio::test]
async fn test_network_error_propagates() {
    let config = ClientConfig::builder()
        .base_url("http://127.0.0.1:1/api/")
        .timeout(Duration::from_secs(2))
        .build();
    let h = harness_with(config, &[(ACCESS_KEY, "A1"), (REFRESH_KEY, "R1")]);

    let err = h.client.get("events/").await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert_eq!(h.store.snapshot().await.len(), 2);
    assert!(h.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access": "A2"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &[(ACCESS_KEY, "A1"), (REFRESH_KEY, "R1")]);
    let (a, b, c) = futures::join!(
        h.client.get("events/"),
        h.client.get("my-bookings/"),
        h.client.get("me/"),
    );

    assert_eq!(a.unwrap().status(), 200);
    assert_eq!(b.unwrap().status(), 200);
    assert_eq!(c.unwrap().status(), 200);
    assert_eq!(refresh_calls(&mock_server).await, 1);
}

#[tokio::test]
async fn test_concurrent_401s_with_rejected_refresh_tear_down_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"code": "token_not_valid"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &[(ACCESS_KEY, "A1"), (REFRESH_KEY, "R1")]);
    let (a, b) = futures::join!(h.client.get("events/"), h.client.get("my-bookings/"));

    let errors = [a.unwrap_err(), b.unwrap_err()];
    assert_eq!(errors.iter().filter(|e| e.is_session_ended()).count(), 1);
    assert!(errors.iter().all(|e| e.is_session_ended() || e.is_unauthorized()));
    assert!(h.store.snapshot().await.is_empty());
    assert_eq!(h.navigator.routes(), vec!["/".to_string()]);
    assert_eq!(refresh_calls(&mock_server).await, 1);
}
