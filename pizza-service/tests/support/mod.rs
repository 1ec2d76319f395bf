use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use pizza_auth::{RevocationRegistry, Role, TokenConfig, TokenService};
use pizza_service::config::ServiceConfig;
use pizza_service::credentials::hash_password;
use pizza_service::store::{MemoryStore, NewUser};
use pizza_service::{router, AppState};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

#[allow(dead_code)]
pub fn test_app() -> TestApp {
    let config = ServiceConfig::default();
    let tokens = TokenService::new(
        TokenConfig::new("test-secret").with_ttl(3600).with_leeway(0),
        RevocationRegistry::new(),
    );
    let state = AppState {
        db: Arc::new(MemoryStore::new()),
        tokens: Arc::new(tokens),
        config: Arc::new(config),
    };
    TestApp {
        router: router(state.clone()),
        state,
    }
}

#[allow(dead_code)]
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[allow(dead_code)]
pub fn assert_valid_jwt(token: &str) {
    let segments: Vec<&str> = token.split('.').collect();
    assert_eq!(segments.len(), 3, "not a three-segment token: {token}");
    for segment in segments {
        assert!(!segment.is_empty(), "empty segment in {token}");
        assert!(
            segment
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'),
            "segment is not base64url: {segment}"
        );
    }
}

#[allow(dead_code)]
pub fn random_email(domain: &str) -> String {
    format!("{}@{domain}", Uuid::new_v4().simple())
}

/// Registers a diner through the API, returning the user object and token.
#[allow(dead_code)]
pub async fn register_diner(app: &TestApp, name: &str, email: &str) -> (Value, String) {
    let (status, body) = send(
        &app.router,
        "POST",
        "/api/auth",
        None,
        Some(json!({ "name": name, "email": email, "password": "a" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    let token = body["token"].as_str().expect("token").to_string();
    assert_valid_jwt(&token);
    (body["user"].clone(), token)
}

/// Seeds an admin user directly through the datastore, the same way an
/// operator would provision one out of band. Returns (email, password).
#[allow(dead_code)]
pub async fn seed_admin(app: &TestApp) -> (String, String) {
    let email = random_email("admin.com");
    let password = "toomanysecrets".to_string();
    let password_hash = hash_password(&password).expect("hash");
    app.state
        .db
        .create_user(NewUser {
            name: "admin".to_string(),
            email: email.clone(),
            password_hash,
            roles: vec![Role::Admin],
        })
        .await
        .expect("seed admin");
    (email, password)
}

#[allow(dead_code)]
pub async fn login(app: &TestApp, email: &str, password: &str) -> (Value, String) {
    let (status, body) = send(
        &app.router,
        "PUT",
        "/api/auth",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let token = body["token"].as_str().expect("token").to_string();
    assert_valid_jwt(&token);
    (body["user"].clone(), token)
}
