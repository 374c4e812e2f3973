//! Router-level tests that need no live database.
//!
//! The pool is created lazily and the exercised paths (auth rejections,
//! input validation, the liveness routes) all answer before any query
//! runs, so these cover the real router, extractors, and envelope.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use pomelo_api::config::ApiConfig;
use pomelo_api::routes;
use pomelo_api::state::AppState;
use pomelo_api::token::TokenSigner;

const TOKEN_SECRET: &str = "f3a9c2e17b8d4065a1c9e2f7b3d80416";

fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://localhost/pomelo_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        token_secret: SecretString::from(TOKEN_SECRET),
        token_ttl: std::time::Duration::from_secs(7200),
        email_account_cap: 4,
        admin_password: SecretString::from("P@ssword2023"),
        seed_url: None,
    }
}

fn test_app() -> Router {
    let config = test_config();
    // Lazy pool: no connection is opened until a query runs, and none of
    // the requests below reach one.
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/pomelo_test")
        .unwrap();

    routes::routes().with_state(AppState::new(config, pool))
}

fn user_token(role: pomelo_core::Role) -> String {
    let signer = TokenSigner::new(TOKEN_SECRET.as_bytes(), std::time::Duration::from_secs(7200));
    signer.issue(pomelo_core::UserId::new(1), role).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_is_alive() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["message"], "I am alive");
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let response = test_app()
        .oneshot(Request::builder().uri("/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "fail");
    assert_eq!(body["data"]["message"], "User not authorized");
}

#[tokio::test]
async fn test_protected_route_with_garbage_token() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/cart")
                .header(header::AUTHORIZATION, "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["message"], "Invalid token was provided!");
}

#[tokio::test]
async fn test_admin_route_rejects_user_role() {
    let token = user_token(pomelo_core::Role::User);

    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/categories")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name": "Laptops"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["status"], "fail");
    assert_eq!(body["data"]["message"], "Restricted access...");
}

#[tokio::test]
async fn test_login_requires_fields() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "fail");
    assert_eq!(body["data"]["username"], "username is required");
    assert_eq!(body["data"]["password"], "password is required");
}

#[tokio::test]
async fn test_signup_reports_every_missing_field() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"username": "ada"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "fail");
    assert!(body["data"].get("username").is_none());
    for field in ["firstName", "lastName", "email", "password"] {
        assert_eq!(body["data"][field], format!("{field} is required"));
    }
}

#[tokio::test]
async fn test_expired_token_is_distinguished() {
    // Hand-craft a stale token with the signer's own secret.
    let claims = serde_json::json!({
        "sub": 1,
        "role": "User",
        "exp": chrono::Utc::now().timestamp() - 3600,
    });
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TOKEN_SECRET.as_bytes()),
    )
    .unwrap();

    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/orders")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["message"], "Token has expired!");
}

#[tokio::test]
async fn test_cart_item_validation() {
    let token = user_token(pomelo_core::Role::User);

    // Missing itemId and a sub-1 amount both reported
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cart_item")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"amount": 0}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["data"]["itemId"], "itemId is required");
    assert_eq!(body["data"]["amount"], "amount must be at least 1");
}
