//! Per-request deadline

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const TIMEOUT_MESSAGE: &str = "Request timeout";

#[derive(Debug, Clone, Copy)]
pub struct TimeoutState {
    pub deadline: Duration,
}

/// Drops the downstream future on expiry and answers 504.
pub async fn enforce_timeout(
    State(state): State<TimeoutState>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    match tokio::time::timeout(state.deadline, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(path = %path, deadline_ms = state.deadline.as_millis() as u64, "request timed out");
            (StatusCode::GATEWAY_TIMEOUT, TIMEOUT_MESSAGE).into_response()
        }
    }
}
