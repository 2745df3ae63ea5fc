//! JSON envelopes for gateway responses
//!
//! Success: `200 {"code": 0, "message": "OK", "data": ...}`.
//! Failure: `{"code": <grpc code>, "message": ..., "error": {"details": ...}}` where the
//! `error` member is only present when the environment exposes error details.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tonic::{Code, Status};

use crate::config::Environment;
use crate::proto::ErrorDetails;

/// Body of a successful response
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T> {
    pub code: i32,
    pub message: &'static str,
    pub data: T,
}

/// Body of a failed response
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

/// Turns gRPC outcomes into HTTP responses
#[derive(Debug, Clone, Copy)]
pub struct Responder {
    expose_details: bool,
}

impl Responder {
    pub fn new(environment: Environment) -> Self {
        Self {
            expose_details: environment.exposes_error_details(),
        }
    }

    pub fn reply<T: Serialize>(&self, result: Result<tonic::Response<T>, Status>) -> Response {
        match result {
            Ok(response) => self.ok(response.into_inner()),
            Err(status) => self.error(&status),
        }
    }

    pub fn ok<T: Serialize>(&self, data: T) -> Response {
        Json(SuccessEnvelope {
            code: 0,
            message: "OK",
            data,
        })
        .into_response()
    }

    pub fn error(&self, status: &Status) -> Response {
        (http_status(status.code()), Json(self.error_envelope(status))).into_response()
    }

    /// Malformed path, query or body, reported as `InvalidArgument`
    pub fn rejected(&self, rejection: impl std::fmt::Display) -> Response {
        self.error(&Status::invalid_argument(rejection.to_string()))
    }

    fn error_envelope(&self, status: &Status) -> ErrorEnvelope {
        ErrorEnvelope {
            code: status.code() as i32,
            message: status.message().to_string(),
            error: self.expose_details.then(|| details_of(status)),
        }
    }
}

/// HTTP status for a gRPC code; anything unmapped is a 200 with an error envelope
pub fn http_status(code: Code) -> StatusCode {
    match code {
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    }
}

/// Encoded details from the status, or its message when there are none
fn details_of(status: &Status) -> ErrorDetails {
    match prost::Message::decode(status.details()) {
        Ok(ErrorDetails { details }) if !details.is_empty() => ErrorDetails { details },
        _ => ErrorDetails {
            details: status.message().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainError, ErrorCode};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(http_status(Code::InvalidArgument), StatusCode::BAD_REQUEST);
        assert_eq!(http_status(Code::PermissionDenied), StatusCode::FORBIDDEN);
        assert_eq!(http_status(Code::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(http_status(Code::Internal), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(http_status(Code::NotFound), StatusCode::OK);
        assert_eq!(http_status(Code::FailedPrecondition), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = Responder::new(Environment::Prod).ok(serde_json::json!({"id": 1, "link": null}));
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({"code": 0, "message": "OK", "data": {"id": 1, "link": null}})
        );
    }

    #[tokio::test]
    async fn test_details_shown_in_dev() {
        let status = DomainError::wrap_msg(ErrorCode::Internal, "Lỗi hệ thống", "connection reset")
            .to_status();

        let response = Responder::new(Environment::Dev).error(&status);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], 13);
        assert_eq!(body["message"], "Lỗi hệ thống");
        assert_eq!(body["error"]["details"], "connection reset");
    }

    #[tokio::test]
    async fn test_details_hidden_in_production() {
        let status = DomainError::code_msg(ErrorCode::FailedPrecondition, "Sai mật khẩu").to_status();

        let response = Responder::new(Environment::Prod).error(&status);
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({"code": 9, "message": "Sai mật khẩu"}));
    }

    #[tokio::test]
    async fn test_plain_status_falls_back_to_message() {
        let response = Responder::new(Environment::Local).error(&Status::unavailable("connection refused"));
        let body = body_json(response).await;
        assert_eq!(body["code"], 14);
        assert_eq!(body["error"]["details"], "connection refused");
    }

    #[tokio::test]
    async fn test_rejection_is_bad_request() {
        let response = Responder::new(Environment::Prod).rejected("Failed to deserialize query string");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], 3);
    }
}
