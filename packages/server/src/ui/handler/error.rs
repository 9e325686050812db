//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::{
    domain::DomainError, infrastructure::dto::http::ErrorResponse, usecase::ShareError,
};

/// `{ "success": false, "message": ... }` を返すエラー
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<ShareError> for ApiError {
    fn from(e: ShareError) -> Self {
        match e {
            ShareError::Unauthorized => Self::unauthorized("Authentication required"),
            ShareError::DocumentNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "Document not found")
            }
            ShareError::LinkNotFound => Self::new(
                StatusCode::NOT_FOUND,
                "Share link not found or expired",
            ),
            ShareError::GrantNotFound(_) => Self::new(StatusCode::NOT_FOUND, "Share not found"),
            ShareError::Forbidden(_) => Self::new(
                StatusCode::FORBIDDEN,
                "You do not have permission for this document",
            ),
            ShareError::InvalidRequest(message) => Self::bad_request(message),
            ShareError::Repository(e) => {
                tracing::error!("Storage failure while handling request: {}", e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

/// リクエストボディを JSON としてパースする（空のボディは既定値）
pub fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::dto::http::CreateShareLinkRequest;

    #[test]
    fn test_share_error_status_mapping() {
        // テスト項目: ShareError が対応する HTTP ステータスに変換される
        // given (前提条件):
        let cases = [
            (ShareError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ShareError::LinkNotFound, StatusCode::NOT_FOUND),
            (
                ShareError::GrantNotFound("bob".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                ShareError::DocumentNotFound("d".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (ShareError::Forbidden("d".to_string()), StatusCode::FORBIDDEN),
            (
                ShareError::InvalidRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (error, expected) in cases {
            // when (操作):
            let response = ApiError::from(error).into_response();

            // then (期待する結果):
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_parse_body_accepts_empty_and_rejects_garbage() {
        // テスト項目: 空のボディは既定値、不正な JSON は 400 になる
        // given (前提条件):
        let empty = b"";
        let garbage = b"{not json";

        // when (操作):
        let parsed: CreateShareLinkRequest = parse_body(empty).unwrap();
        let error = parse_body::<CreateShareLinkRequest>(garbage).unwrap_err();

        // then (期待する結果):
        assert!(parsed.permission.is_none());
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }
}
