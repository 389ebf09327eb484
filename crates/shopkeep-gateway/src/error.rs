// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of [`ShopError`] onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use shopkeep_core::ShopError;
use tracing::{debug, error};

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error wrapping [`ShopError`].
///
/// Validation and form errors map to 400, missing products to 404, duplicate
/// ids to 409, provider failures to 502, timeouts to 504 and everything else
/// to 500.
#[derive(Debug)]
pub struct ApiError(pub ShopError);

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ShopError::Validation(_) | ShopError::Form(_) => StatusCode::BAD_REQUEST,
            ShopError::NotFound(_) => StatusCode::NOT_FOUND,
            ShopError::Conflict(_) => StatusCode::CONFLICT,
            ShopError::Provider { .. } => StatusCode::BAD_GATEWAY,
            ShopError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ShopError::Config(_) | ShopError::Storage { .. } | ShopError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            debug!(status = status.as_u16(), error = %self.0, "request rejected");
        } else if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "request failed");
        }

        match self.0 {
            ShopError::Form(errors) => (
                status,
                Json(serde_json::json!({ "success": false, "errors": errors })),
            )
                .into_response(),
            other => (
                status,
                Json(ErrorResponse {
                    error: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopkeep_core::FieldErrors;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn client_and_server_errors_log_differently() {
        let _ = ApiError(ShopError::NotFound("Product not found".into())).into_response();
        assert!(logs_contain("request rejected"));
        assert!(!logs_contain("request failed"));

        let _ = ApiError(ShopError::Internal("disk full".into())).into_response();
        assert!(logs_contain("request failed"));
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (ShopError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ShopError::Form(FieldErrors::new()), StatusCode::BAD_REQUEST),
            (ShopError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ShopError::Conflict("x".into()), StatusCode::CONFLICT),
            (ShopError::provider("x"), StatusCode::BAD_GATEWAY),
            (
                ShopError::Timeout {
                    duration: std::time::Duration::from_secs(1),
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (ShopError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn error_response_serializes() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "Product X not found".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"Product X not found"}"#);
    }
}
