//! End-to-end tests for the sign-in flow against a mock intercom API.
//!
//! These drive the real `App` and `ApiClient` over HTTP, exercising the
//! startup refresh, login submission, token persistence, and the bounded
//! compensating retry for malformed responses.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use intercom_tui::api::ApiClient;
use intercom_tui::app::{App, AuthEvent, Screen};
use intercom_tui::auth::TokenStore;
use intercom_tui::config::Config;

fn app_for(server: &MockServer, dir: &TempDir) -> App {
    let config = Config {
        endpoint: format!("{}/api", server.uri()),
        data_dir: Some(dir.path().to_path_buf()),
    };
    App::with_config(config).expect("app")
}

fn store_for(dir: &TempDir) -> TokenStore {
    TokenStore::new(dir.path().to_path_buf())
}

async fn next_completion(app: &mut App) -> AuthEvent {
    let event = tokio::time::timeout(Duration::from_secs(5), app.next_event())
        .await
        .expect("background operation completion")
        .expect("event");
    event
}

#[tokio::test]
async fn startup_refresh_stores_stripped_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "data": { "refreshToken": "Bearer abc123" }
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = app_for(&server, &dir);

    app.start_refresh();
    let event = next_completion(&mut app).await;
    app.apply_event(event);

    assert!(app.authenticated);
    assert_eq!(app.screen, Screen::Home);
    assert_eq!(store_for(&dir).load().as_deref(), Some("abc123"));
}

#[tokio::test]
async fn startup_refresh_without_token_is_a_noop() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "data": { "refreshToken": null }
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = app_for(&server, &dir);

    app.start_refresh();
    let event = next_completion(&mut app).await;
    app.apply_event(event);

    assert!(!app.authenticated);
    assert_eq!(app.screen, Screen::SignIn);
    assert!(!store_for(&dir).exists());
}

#[tokio::test]
async fn malformed_refresh_clears_token_and_retries_exactly_once() {
    let server = MockServer::start().await;
    // An HTML error page in place of JSON, on both attempts
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Bad Gateway</html>"))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_for(&dir);
    store.store("stale-token").expect("store");

    let mut app = app_for(&server, &dir);

    app.start_refresh();
    let first = next_completion(&mut app).await;
    app.apply_event(first);

    // Token slot cleared to empty by the compensating path
    assert!(store.exists());
    assert!(store.load().is_none());

    // The single retry also gets a malformed body; handled generically
    let second = next_completion(&mut app).await;
    app.apply_event(second);
    assert!(!app.authenticated);

    // No third attempt is ever issued
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn transport_failure_on_refresh_does_not_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = app_for(&server, &dir);

    app.start_refresh();
    let event = next_completion(&mut app).await;
    app.apply_event(event);

    assert!(!app.authenticated);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn submitted_login_sends_credentials_and_stores_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_partial_json(json!({
            "variables": { "isRemember": true, "password": "hunter2" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "data": { "login": "Bearer issued-token" }
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = app_for(&server, &dir);

    app.edit_password("hunter2".into());
    app.edit_remember(true);
    assert!(app.submit());
    assert!(app.loading);

    let event = next_completion(&mut app).await;
    app.apply_event(event);

    assert!(!app.loading);
    assert!(app.authenticated);
    assert_eq!(app.screen, Screen::Home);
    assert_eq!(store_for(&dir).load().as_deref(), Some("issued-token"));
    // Credentials are transient: the password is dropped after success
    assert!(app.password.is_empty());
}

#[tokio::test]
async fn rejected_login_fails_silently_into_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{ "message": "wrong password" }]
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = app_for(&server, &dir);
    app.authenticated = true;
    app.screen = Screen::Home;

    app.edit_password("nope".into());
    assert!(app.submit());

    let event = next_completion(&mut app).await;
    app.apply_event(event);

    assert!(!app.authenticated);
    assert_eq!(app.screen, Screen::SignIn);
    assert!(!store_for(&dir).exists());
}

#[tokio::test]
async fn requests_carry_the_stored_token_as_bearer_header() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_for(&dir);
    store.store("stored-token").expect("store");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(header("authorization", "Bearer stored-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "data": { "refreshToken": "Bearer renewed" }
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(
        format!("{}/api", server.uri()),
        Arc::new(TokenStore::new(dir.path().to_path_buf())),
    )
    .expect("client");

    let renewed = client.refresh_token().await.expect("refresh");
    assert_eq!(renewed.as_deref(), Some("Bearer renewed"));
}

#[tokio::test]
async fn token_lookup_is_fresh_on_every_request() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_for(&dir);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "refreshToken": null } })),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(
        format!("{}/api", server.uri()),
        Arc::new(TokenStore::new(dir.path().to_path_buf())),
    )
    .expect("client");

    // First request: no token stored yet, header is the empty string
    client.refresh_token().await.expect("refresh");
    // Token written between requests is picked up without rebuilding
    store.store("late-token").expect("store");
    client.refresh_token().await.expect("refresh");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let auth_header = |i: usize| {
        requests[i]
            .headers
            .get("authorization")
            .expect("authorization header")
            .to_str()
            .expect("header value")
            .to_string()
    };
    assert_eq!(auth_header(0), "");
    assert_eq!(auth_header(1), "Bearer late-token");
}

#[tokio::test]
async fn sequential_submits_issue_two_independent_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "data": { "login": "Bearer tok" }
            })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = app_for(&server, &dir);
    app.edit_password("same".into());

    assert!(app.submit());
    let first = next_completion(&mut app).await;
    app.apply_event(first);

    assert!(app.submit());
    let second = next_completion(&mut app).await;
    app.apply_event(second);

    assert!(app.authenticated);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
