//! JSON response envelope.
//!
//! Every response carries a `status` discriminator so clients can branch
//! without inspecting HTTP status codes:
//!
//! - `success` - the request did what it said; payload under `data`
//! - `fail`    - the request was rejected; rejection details under `data`
//! - `error`   - something broke server-side; human message under `message`

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

/// A `200 success` envelope.
pub fn success<T: Serialize>(data: T) -> Response {
    success_at(StatusCode::OK, data)
}

/// A `success` envelope with an explicit status code.
pub fn success_at<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(json!({ "status": "success", "data": data }))).into_response()
}

/// A `fail` envelope: the client's request was rejected.
pub fn fail<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(json!({ "status": "fail", "data": data }))).into_response()
}

/// An `error` envelope: the server could not process the request.
pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "status": "error", "message": message.into() })),
    )
        .into_response()
}

/// Shorthand for the common `fail` payload `{"message": ...}`.
pub fn fail_message(status: StatusCode, message: impl Into<String>) -> Response {
    fail(status, json!({ "message": message.into() }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = success(json!({ "token": "abc" }));
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["token"], "abc");
    }

    #[tokio::test]
    async fn test_fail_envelope() {
        let response = fail_message(StatusCode::NOT_FOUND, "Content not found");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["data"]["message"], "Content not found");
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let response = error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "boom");
        assert!(body.get("data").is_none());
    }
}
