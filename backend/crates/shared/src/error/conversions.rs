//! Error conversions - HTTP mapping for [`AppError`] and database error codes

#[cfg(feature = "axum")]
use super::app_error::AppError;

/// PostgreSQL の一意制約違反コード
pub const PG_UNIQUE_VIOLATION: &str = "23505";

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::json!({ "error": self.public_message() });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    #[cfg(feature = "axum")]
    #[tokio::test]
    async fn test_into_response_uses_error_field() {
        use axum::response::IntoResponse;
        use http_body_util::BodyExt;

        use super::AppError;

        let response = AppError::internal("pool closed").into_response();
        assert_eq!(response.status(), 500);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
    }

    #[cfg(feature = "axum")]
    #[tokio::test]
    async fn test_client_error_keeps_message() {
        use axum::response::IntoResponse;
        use http_body_util::BodyExt;

        use super::AppError;

        let response = AppError::bad_request("Invalid input").into_response();
        assert_eq!(response.status(), 400);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Invalid input" }));
    }
}
