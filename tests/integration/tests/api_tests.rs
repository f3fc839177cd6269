//! API integration tests against an in-process server on the in-memory store
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, test_config, unique_registration, Created, Envelope, Profile,
    TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["store"], "healthy");
}

#[tokio::test]
async fn test_request_id_propagated() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_first_user() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post("/api/v1/users", &json!({ "username": "Alice123" }))
        .await
        .unwrap();
    let created: Envelope<Created> = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(created.data.uid, 1);
    assert_eq!(created.data.userslug, "alice123");
}

#[tokio::test]
async fn test_register_then_fetch_profile() {
    let server = TestServer::start().await.expect("Failed to start server");

    let body = json!({
        "username": "Bob Smith",
        "email": "bob@example.com",
        "password": "Secret123",
        "fullname": "Robert Smith",
        "reputation": 9000,
    });
    let response = server.post("/api/v1/users", &body).await.unwrap();
    let created: Envelope<Created> = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(created.data.userslug, "bob-smith");

    let response = server
        .get(&format!("/api/v1/users/{}", created.data.uid))
        .await
        .unwrap();
    let raw: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(raw["data"].get("email").is_none());
    assert!(raw["data"].get("password").is_none());

    let profile: Profile = serde_json::from_value(raw["data"].clone()).unwrap();
    assert_eq!(profile.uid, created.data.uid);
    assert_eq!(profile.username, "Bob Smith");
    assert_eq!(profile.fullname, "Robert Smith");
    assert_eq!(profile.reputation, 0);
    assert_eq!(profile.postcount, 0);
    assert!(!profile.banned);
    assert_eq!(profile.status, "online");
    assert!(profile.joindate > 0);
    assert!(profile.picture.starts_with("https://www.gravatar.com/avatar/"));
    assert!(profile.custom_fields.is_empty());

    let response = server.get("/api/v1/users/slug/bob-smith").await.unwrap();
    let by_slug: Envelope<Profile> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(by_slug.data.uid, created.data.uid);
    assert_eq!(by_slug.data.userslug, "bob-smith");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let server = TestServer::start().await.expect("Failed to start server");

    let first = server
        .post("/api/v1/users", &json!({ "username": "carol" }))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let response = server
        .post("/api/v1/users", &json!({ "username": "CAROL" }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "USERNAME_TAKEN");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let server = TestServer::start().await.expect("Failed to start server");

    let mut body = unique_registration();
    server.post("/api/v1/users", &body).await.unwrap();

    body["username"] = json!("someone-else");
    let response = server.post("/api/v1/users", &body).await.unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "EMAIL_TAKEN");
}

#[tokio::test]
async fn test_register_invalid_input() {
    let server = TestServer::start().await.expect("Failed to start server");

    let cases = [
        (json!({ "username": "" }), "INVALID_USERNAME"),
        (json!({ "email": "dave@example.com" }), "INVALID_USERNAME"),
        (json!({ "username": "dave", "email": "nope" }), "INVALID_EMAIL"),
        (json!({ "username": "dave", "password": "short" }), "INVALID_PASSWORD"),
    ];

    for (body, expected) in cases {
        let response = server.post("/api/v1/users", &body).await.unwrap();
        let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
        assert_eq!(code, expected, "body: {body}");
    }

    // Nothing was allocated by the failures
    let response = server
        .post("/api/v1/users", &json!({ "username": "dave" }))
        .await
        .unwrap();
    let created: Envelope<Created> = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(created.data.uid, 1);
}

#[tokio::test]
async fn test_register_malformed_body() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.post_raw("/api/v1/users", "{not json").await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_BODY");

    let response = server.post_raw("/api/v1/users", "[1, 2]").await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_BODY");
}

#[tokio::test]
async fn test_configured_username_policy() {
    let config = test_config(&[("USERNAME_MIN_LENGTH", "5")]).unwrap();
    let server = TestServer::start_with_config(config).await.unwrap();

    let response = server
        .post("/api/v1/users", &json!({ "username": "abc" }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_USERNAME");
}

#[tokio::test]
async fn test_concurrent_registrations_get_distinct_uids() {
    let server = TestServer::start().await.expect("Failed to start server");

    let requests = (0..10).map(|_| {
        let body = unique_registration();
        let server = &server;
        async move { server.post("/api/v1/users", &body).await }
    });
    let responses = futures::future::join_all(requests).await;

    let mut uids = Vec::new();
    for response in responses {
        let created: Envelope<Created> =
            assert_json(response.unwrap(), StatusCode::CREATED).await.unwrap();
        uids.push(created.data.uid);
    }
    uids.sort_unstable();
    assert_eq!(uids, (1..=10).collect::<Vec<_>>());
}

// ============================================================================
// Lookups
// ============================================================================

#[tokio::test]
async fn test_get_unknown_user() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/api/v1/users/42").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server.get("/api/v1/users/slug/nobody").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_user_bad_uid() {
    let server = TestServer::start().await.expect("Failed to start server");

    for path in ["/api/v1/users/abc", "/api/v1/users/0"] {
        let response = server.get(path).await.unwrap();
        let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
        assert_eq!(code, "INVALID_PATH_PARAMETER");
    }
}
