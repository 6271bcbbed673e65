//! API errors rendered through the error-code table.

use std::any::Any;

use axum::Json;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::{ErrorCode, Language};

/// An error code plus the language its message should be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    pub code: ErrorCode,
    pub language: Language,
}

impl ApiError {
    pub fn new(code: ErrorCode, language: Language) -> Self {
        Self { code, language }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let msg = self.code.message(self.language);
        if msg.status.is_server_error() {
            tracing::error!(code = %self.code, "request failed");
        }
        (
            msg.status,
            Json(json!({
                "code": msg.code,
                "message": msg.message
            })),
        )
            .into_response()
    }
}

/// Response language from the `accept-language` header.
pub fn language(headers: &HeaderMap) -> Language {
    Language::from_header(
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok()),
    )
}

/// 500 response for a panicking handler.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "code": ErrorCode::InternalServerError,
            "message": "Internal server error"
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::HeaderValue;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_is_404_with_code() {
        let response = ApiError::new(ErrorCode::DataNotFound, Language::En).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], "DATA_NOT_FOUND");
        assert_eq!(body["message"], "Data not found");
    }

    #[tokio::test]
    async fn thai_message() {
        let response = ApiError::new(ErrorCode::BadRequest, Language::Th).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "คำขอไม่ถูกต้อง");
    }

    #[tokio::test]
    async fn panic_is_500() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn language_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(language(&headers), Language::En);
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("th"));
        assert_eq!(language(&headers), Language::Th);
    }
}
