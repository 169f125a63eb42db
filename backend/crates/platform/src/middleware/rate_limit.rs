//! Per-client rate limiting over a [`RateLimitStore`]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::client::extract_client_ip;
use crate::rate_limit::{RateLimitConfig, RateLimitStore};

pub const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded";

/// One limiter class. Routes sharing a class share `store`.
pub struct RateLimitState<S> {
    pub store: Arc<S>,
    pub config: RateLimitConfig,
    pub trust_forwarded: bool,
}

impl<S> Clone for RateLimitState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            trust_forwarded: self.trust_forwarded,
        }
    }
}

impl<S> RateLimitState<S> {
    pub fn new(store: Arc<S>, config: RateLimitConfig) -> Self {
        Self {
            store,
            config,
            trust_forwarded: false,
        }
    }

    pub fn trust_forwarded(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }
}

fn client_key(req: &Request, trust_forwarded: bool) -> String {
    let direct = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    extract_client_ip(req.headers(), direct, trust_forwarded)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 429 once a client exceeds its class budget. Store failures let the
/// request through.
pub async fn limit_requests<S>(
    State(state): State<RateLimitState<S>>,
    req: Request,
    next: Next,
) -> Response
where
    S: RateLimitStore + Send + Sync + 'static,
{
    let key = client_key(&req, state.trust_forwarded);

    match state.store.check_and_increment(&key, &state.config).await {
        Ok(result) if result.allowed => next.run(req).await,
        Ok(result) => {
            tracing::warn!(client = %key, path = %req.uri().path(), "rate limit exceeded");
            let mut response = (StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED_MESSAGE).into_response();
            if let Ok(value) = HeaderValue::from_str(&result.retry_after.as_secs().max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "rate limit store failed");
            next.run(req).await
        }
    }
}
