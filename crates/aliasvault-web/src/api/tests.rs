use std::sync::Arc;

use axum::body::Body;
use axum::extract::Path;
use axum::http::{header, request, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use aliasvault_core::password::hash_password;
use aliasvault_core::{
    create_token, create_token_at, load_settings, save_settings, unix_now, verify_token,
    MemoryStore, Settings,
};

use crate::config::ServerConfig;
use crate::state::AppState;

const ORIGIN: &str = "http://localhost:5173";
const PASSWORD: &str = "correct horse battery";
const API_KEY: &str = "addy-test-key";
const SECRET: &str = "router-test-signing-secret";
const UNREACHABLE: &str = "http://127.0.0.1:1";

// --- Harness ---

fn test_state(upstream_url: &str) -> AppState {
    let mut config = ServerConfig::default();
    config.upstream.base_url = upstream_url.to_string();
    config.upstream.timeout_secs = 5;
    AppState::new(config, Arc::new(MemoryStore::new())).unwrap()
}

async fn initialized_state(upstream_url: &str) -> AppState {
    let state = test_state(upstream_url);
    let settings = Settings {
        admin_password_hash: hash_password(PASSWORD).unwrap(),
        addy_api_key: API_KEY.to_string(),
        jwt_secret: SECRET.to_string(),
        initialized: true,
    };
    save_settings(state.store.as_ref(), &settings).await.unwrap();
    state
}

fn admin_token() -> String {
    create_token(SECRET).unwrap().0
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send(state: &AppState, request: Request<Body>) -> TestResponse {
    let response = super::router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

fn builder(method: &str, uri: &str) -> request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ORIGIN, ORIGIN)
}

fn empty(method: &str, uri: &str) -> Request<Body> {
    builder(method, uri).body(Body::empty()).unwrap()
}

fn with_json(builder: request::Builder, body: Value) -> Request<Body> {
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> request::Builder {
    builder(method, uri).header(header::AUTHORIZATION, format!("Bearer {token}"))
}

fn login_request(client: &str, password: &str) -> Request<Body> {
    with_json(
        builder("POST", "/auth").header("cf-connecting-ip", client),
        json!({ "password": password }),
    )
}

// --- Fake upstream ---

fn has_api_key(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {API_KEY}");
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str())
}

async fn fake_list_aliases(headers: HeaderMap) -> Response {
    if !has_api_key(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthenticated." })),
        )
            .into_response();
    }
    Json(json!({ "data": [{ "id": "a1", "email": "shop@example.com", "active": true }] }))
        .into_response()
}

async fn fake_create_alias(Json(body): Json<Value>) -> Response {
    if body["domain"] == "bad.example" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "The domain is invalid" })),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({ "data": { "id": "new-alias", "sent": body } })),
    )
        .into_response()
}

async fn fake_update_alias(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "data": { "id": id, "description": body["description"] } }))
}

async fn fake_no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fake_enable_alias(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "data": { "id": body["id"], "active": true } }))
}

async fn fake_broken_recipients() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "upstream exploded" })),
    )
        .into_response()
}

async fn fake_domains(headers: HeaderMap) -> Response {
    let json_content = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        == Some("application/json");
    if !json_content {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(json!({ "message": "Content-Type must be application/json" })),
        )
            .into_response();
    }
    Json(json!({ "data": [{ "id": "d1", "domain": "example.com" }] })).into_response()
}

async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/aliases", get(fake_list_aliases).post(fake_create_alias))
        .route(
            "/aliases/{id}",
            patch(fake_update_alias).delete(fake_no_content),
        )
        .route("/active-aliases", post(fake_enable_alias))
        .route("/active-aliases/{id}", delete(fake_no_content))
        .route("/recipients", get(fake_broken_recipients))
        .route("/domains", get(fake_domains));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// --- Origin guard and CORS ---

#[tokio::test]
async fn request_without_origin_is_forbidden() {
    let state = test_state(UNREACHABLE);
    let request = Request::builder()
        .uri("/initialize/check")
        .body(Body::empty())
        .unwrap();
    let res = send(&state, request).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn origin_rejection_carries_security_headers() {
    let state = test_state(UNREACHABLE);
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let res = send(&state, request).await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.headers["x-content-type-options"], "nosniff");
    assert!(res.headers.get("content-security-policy").is_some());
}

#[tokio::test]
async fn foreign_origin_is_forbidden() {
    let state = test_state(UNREACHABLE);
    let request = Request::builder()
        .uri("/initialize/check")
        .header(header::ORIGIN, "https://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let res = send(&state, request).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn preflight_is_answered_with_cors_headers() {
    let state = test_state(UNREACHABLE);
    let request = builder("OPTIONS", "/aliases")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();
    let res = send(&state, request).await;

    assert!(res.status.is_success());
    assert_eq!(res.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
    assert_eq!(res.headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
}

// --- Setup ---

#[tokio::test]
async fn fresh_instance_reports_uninitialized() {
    let state = test_state(UNREACHABLE);
    let res = send(&state, empty("GET", "/initialize/check")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "success": true, "data": { "initialized": false } }));
}

#[tokio::test]
async fn gated_routes_require_setup() {
    let state = test_state(UNREACHABLE);

    let auth = send(&state, login_request("1.2.3.4", PASSWORD)).await;
    assert_eq!(auth.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(auth.body["error"]["code"], "NOT_INITIALIZED");

    let health = send(&state, empty("GET", "/health")).await;
    assert_eq!(health.status, StatusCode::SERVICE_UNAVAILABLE);

    let aliases = send(&state, empty("GET", "/aliases")).await;
    assert_eq!(aliases.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn initialize_stores_settings_and_returns_token() {
    let state = test_state(UNREACHABLE);
    let res = send(
        &state,
        with_json(
            builder("POST", "/initialize"),
            json!({ "admin_password": PASSWORD, "addy_api_key": API_KEY }),
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["message"], "System initialized successfully");

    let stored = load_settings(state.store.as_ref()).await.unwrap();
    assert!(stored.initialized);
    assert_eq!(stored.addy_api_key, API_KEY);
    assert_eq!(stored.jwt_secret.len(), 32);
    assert_ne!(stored.admin_password_hash, PASSWORD);

    let token = res.body["data"]["token"].as_str().unwrap();
    assert!(verify_token(&stored.jwt_secret, token));

    let check = send(&state, empty("GET", "/initialize/check")).await;
    assert_eq!(check.body["data"]["initialized"], true);
}

#[tokio::test]
async fn initialize_keeps_supplied_secret() {
    let state = test_state(UNREACHABLE);
    let res = send(
        &state,
        with_json(
            builder("POST", "/initialize"),
            json!({ "admin_password": PASSWORD, "addy_api_key": API_KEY, "jwt_secret": SECRET }),
        ),
    )
    .await;

    let token = res.body["data"]["token"].as_str().unwrap();
    assert!(verify_token(SECRET, token));
}

#[tokio::test]
async fn initialize_twice_is_rejected() {
    let state = initialized_state(UNREACHABLE).await;
    let res = send(
        &state,
        with_json(
            builder("POST", "/initialize"),
            json!({ "admin_password": "other", "addy_api_key": "other" }),
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"]["code"], "ALREADY_INITIALIZED");
}

#[tokio::test]
async fn initialize_requires_password_and_api_key() {
    let state = test_state(UNREACHABLE);
    let res = send(
        &state,
        with_json(
            builder("POST", "/initialize"),
            json!({ "admin_password": PASSWORD }),
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"]["code"], "MISSING_FIELDS");
    assert!(load_settings(state.store.as_ref()).await.is_none());
}

#[tokio::test]
async fn malformed_json_gets_error_envelope() {
    let state = test_state(UNREACHABLE);
    let request = builder("POST", "/initialize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let res = send(&state, request).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["error"]["code"], "INVALID_REQUEST");
}

// --- Credential check ---

#[tokio::test]
async fn correct_password_yields_verifiable_token() {
    let state = initialized_state(UNREACHABLE).await;
    let res = send(&state, login_request("1.2.3.4", PASSWORD)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    let token = res.body["token"].as_str().unwrap();
    assert!(verify_token(SECRET, token));
}

#[tokio::test]
async fn wrong_password_is_401() {
    let state = initialized_state(UNREACHABLE).await;
    let res = send(&state, login_request("1.2.3.4", "nope")).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(state.rate_limiter.failure_count("1.2.3.4"), Some(1));
}

#[tokio::test]
async fn sixth_attempt_after_five_failures_is_rate_limited() {
    let state = initialized_state(UNREACHABLE).await;

    for _ in 0..5 {
        let res = send(&state, login_request("1.2.3.4", "wrong")).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while the window is open.
    let res = send(&state, login_request("1.2.3.4", PASSWORD)).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.body["error"]["code"], "RATE_LIMITED");

    let other = send(&state, login_request("5.6.7.8", PASSWORD)).await;
    assert_eq!(other.status, StatusCode::OK);
}

#[tokio::test]
async fn successful_login_does_not_clear_failures() {
    let state = initialized_state(UNREACHABLE).await;

    for _ in 0..4 {
        send(&state, login_request("9.9.9.9", "wrong")).await;
    }
    let ok = send(&state, login_request("9.9.9.9", PASSWORD)).await;
    assert_eq!(ok.status, StatusCode::OK);

    let fifth = send(&state, login_request("9.9.9.9", "wrong")).await;
    assert_eq!(fifth.status, StatusCode::UNAUTHORIZED);

    let locked = send(&state, login_request("9.9.9.9", PASSWORD)).await;
    assert_eq!(locked.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn missing_password_counts_as_failure() {
    let state = initialized_state(UNREACHABLE).await;
    let request = with_json(
        builder("POST", "/auth").header("cf-connecting-ip", "4.4.4.4"),
        json!({}),
    );
    let res = send(&state, request).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(state.rate_limiter.failure_count("4.4.4.4"), Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_wrong_logins_stay_within_budget() {
    let state = initialized_state(UNREACHABLE).await;
    let mut attempts = tokio::task::JoinSet::new();
    for _ in 0..30 {
        let state = state.clone();
        attempts.spawn(async move { send(&state, login_request("6.6.6.6", "wrong")).await.status });
    }

    let mut rejected = 0;
    let mut limited = 0;
    while let Some(status) = attempts.join_next().await {
        match status.unwrap() {
            StatusCode::UNAUTHORIZED => rejected += 1,
            StatusCode::TOO_MANY_REQUESTS => limited += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(rejected, 5);
    assert_eq!(limited, 25);
    assert_eq!(state.rate_limiter.failure_count("6.6.6.6"), Some(5));
    assert_eq!(state.rate_limiter.in_flight("6.6.6.6"), Some(0));
}

#[tokio::test]
async fn missing_client_header_shares_unknown_bucket() {
    let state = initialized_state(UNREACHABLE).await;
    let request = with_json(builder("POST", "/auth"), json!({ "password": "wrong" }));
    send(&state, request).await;

    assert_eq!(state.rate_limiter.failure_count("unknown"), Some(1));
}

// --- Authorization gate ---

#[tokio::test]
async fn protected_route_rejects_missing_and_bad_tokens() {
    let state = initialized_state(UNREACHABLE).await;
    let expired = create_token_at(SECRET, unix_now() - 7200).unwrap().0;
    let forged = create_token("some-other-secret").unwrap().0;

    let cases = vec![
        empty("GET", "/aliases"),
        builder("GET", "/aliases")
            .header(header::AUTHORIZATION, "Basic YWRtaW46cGFzcw==")
            .body(Body::empty())
            .unwrap(),
        authed("GET", "/aliases", "not.a.token").body(Body::empty()).unwrap(),
        authed("GET", "/aliases", &expired).body(Body::empty()).unwrap(),
        authed("GET", "/aliases", &forged).body(Body::empty()).unwrap(),
    ];

    for request in cases {
        let res = send(&state, request).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.body["error"]["code"], "INVALID_TOKEN");
        assert_eq!(res.body["error"]["message"], "Invalid or missing token");
    }
}

#[tokio::test]
async fn unknown_route_is_gated_then_404() {
    let state = initialized_state(UNREACHABLE).await;

    let anonymous = send(&state, empty("GET", "/nowhere")).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let authed_res = send(
        &state,
        authed("GET", "/nowhere", &admin_token()).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(authed_res.status, StatusCode::NOT_FOUND);
    assert_eq!(authed_res.body["error"]["code"], "NOT_FOUND");

    let wrong_method = send(
        &state,
        authed("GET", "/auth", &admin_token()).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(wrong_method.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_ok_with_security_headers() {
    let state = initialized_state(UNREACHABLE).await;
    let res = send(&state, empty("GET", "/health")).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["initialized"], true);
    assert_eq!(res.headers["x-content-type-options"], "nosniff");
    assert_eq!(res.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
    assert!(res.headers.get("strict-transport-security").is_none());
}

// --- Settings ---

#[tokio::test]
async fn rotating_secret_invalidates_existing_tokens() {
    let state = initialized_state(UNREACHABLE).await;
    let old_token = admin_token();

    let res = send(
        &state,
        with_json(
            authed("PATCH", "/settings", &old_token),
            json!({ "jwt_secret": "rotated-secret-value" }),
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["message"], "Settings updated successfully");

    let stale = send(
        &state,
        with_json(authed("PATCH", "/settings", &old_token), json!({})),
    )
    .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let login = send(&state, login_request("1.2.3.4", PASSWORD)).await;
    let fresh = login.body["token"].as_str().unwrap();
    assert!(verify_token("rotated-secret-value", fresh));
}

#[tokio::test]
async fn password_change_takes_effect_and_keeps_other_fields() {
    let state = initialized_state(UNREACHABLE).await;

    let res = send(
        &state,
        with_json(
            authed("PATCH", "/settings", &admin_token()),
            json!({ "admin_password": "new password", "addy_api_key": "" }),
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);

    let stored = load_settings(state.store.as_ref()).await.unwrap();
    assert_eq!(stored.addy_api_key, API_KEY);
    assert_eq!(stored.jwt_secret, SECRET);

    let old = send(&state, login_request("1.2.3.4", PASSWORD)).await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
    let new = send(&state, login_request("1.2.3.4", "new password")).await;
    assert_eq!(new.status, StatusCode::OK);
}

// --- Forwarding ---

#[tokio::test]
async fn aliases_are_listed_through_upstream() {
    let upstream = spawn_upstream().await;
    let state = initialized_state(&upstream).await;

    let res = send(
        &state,
        authed("GET", "/aliases", &admin_token()).body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["data"][0]["id"], "a1");
}

#[tokio::test]
async fn create_alias_forwards_only_filled_fields() {
    let upstream = spawn_upstream().await;
    let state = initialized_state(&upstream).await;

    let res = send(
        &state,
        with_json(
            authed("POST", "/aliases", &admin_token()),
            json!({ "local_part": "", "domain": "example.com", "recipient_ids": [] }),
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["data"]["sent"], json!({ "domain": "example.com" }));
}

#[tokio::test]
async fn upstream_mutation_error_keeps_status_and_details() {
    let upstream = spawn_upstream().await;
    let state = initialized_state(&upstream).await;

    let res = send(
        &state,
        with_json(
            authed("POST", "/aliases", &admin_token()),
            json!({ "domain": "bad.example" }),
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["error"]["code"], "ADDY_API_ERROR");
    assert_eq!(res.body["error"]["message"], "Failed to create alias");
    assert_eq!(res.body["error"]["details"], "The domain is invalid");
}

#[tokio::test]
async fn upstream_list_error_is_bad_gateway() {
    let upstream = spawn_upstream().await;
    let state = initialized_state(&upstream).await;

    let res = send(
        &state,
        authed("GET", "/recipients", &admin_token()).body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_eq!(res.body["error"]["details"], "upstream exploded");
}

#[tokio::test]
async fn alias_lifecycle_is_forwarded() {
    let upstream = spawn_upstream().await;
    let state = initialized_state(&upstream).await;
    let token = admin_token();

    let updated = send(
        &state,
        with_json(
            authed("PATCH", "/aliases/a1", &token),
            json!({ "description": "renamed" }),
        ),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["id"], "a1");
    assert_eq!(updated.body["data"]["description"], "renamed");

    let enabled = send(
        &state,
        authed("POST", "/aliases/a1/enable", &token).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(enabled.status, StatusCode::OK);
    assert_eq!(enabled.body["data"]["active"], true);

    let disabled = send(
        &state,
        authed("POST", "/aliases/a1/disable", &token).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(disabled.status, StatusCode::OK);

    let deleted = send(
        &state,
        authed("DELETE", "/aliases/a1", &token).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, json!({ "success": true }));

    let domains = send(
        &state,
        authed("GET", "/domains", &token).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(domains.body["data"][0]["domain"], "example.com");
}

#[tokio::test]
async fn bodiless_upstream_calls_declare_json() {
    let upstream = spawn_upstream().await;
    let state = initialized_state(&upstream).await;

    let res = send(
        &state,
        authed("GET", "/domains", &admin_token()).body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"][0]["id"], "d1");
}

#[tokio::test]
async fn invalid_alias_id_is_rejected_before_forwarding() {
    let state = initialized_state(UNREACHABLE).await;
    let res = send(
        &state,
        authed("DELETE", "/aliases/bad%20id", &admin_token())
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn unreachable_upstream_is_internal_error() {
    let state = initialized_state(UNREACHABLE).await;
    let res = send(
        &state,
        authed("GET", "/domains", &admin_token()).body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"]["code"], "INTERNAL_ERROR");
}
