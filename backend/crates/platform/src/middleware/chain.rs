//! Canonical middleware stack for one route
//!
//! Outermost to innermost:
//! CSP → CORS → error pages → path/method → rate limiter → timeout → route.
//! Route-specific layers (authentication, CSRF) are added to the
//! [`MethodRouter`] before it is wrapped, so they sit inside the timeout.

use std::time::Duration;

use axum::{
    http::Method,
    middleware::{from_fn, from_fn_with_state},
    routing::MethodRouter,
};

use super::{
    cors::apply_cors,
    csp::set_csp_headers,
    error_page::{ErrorPageRenderer, ErrorPageState, render_error_pages},
    path_method::{PathMethodRule, validate_path_method},
    rate_limit::{RateLimitState, limit_requests},
    timeout::{TimeoutState, enforce_timeout},
};
use crate::rate_limit::MemoryRateLimitStore;

#[derive(Clone)]
pub struct RouteChain {
    renderer: ErrorPageRenderer,
    timeout: Duration,
    limiter: Option<RateLimitState<MemoryRateLimitStore>>,
    error_pages: bool,
}

impl RouteChain {
    pub fn new(renderer: ErrorPageRenderer, timeout: Duration) -> Self {
        Self {
            renderer,
            timeout,
            limiter: None,
            error_pages: true,
        }
    }

    pub fn with_limiter(mut self, limiter: RateLimitState<MemoryRateLimitStore>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// JSON-only endpoints keep their downstream bodies.
    pub fn without_error_pages(mut self) -> Self {
        self.error_pages = false;
        self
    }

    pub fn renderer(&self) -> ErrorPageRenderer {
        self.renderer
    }

    /// Wrap `route`, declared to answer only `method` on `path`.
    pub fn wrap<S>(&self, path: &'static str, method: Method, route: MethodRouter<S>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mut route = route.layer(from_fn_with_state(
            TimeoutState {
                deadline: self.timeout,
            },
            enforce_timeout,
        ));

        if let Some(limiter) = &self.limiter {
            route = route.layer(from_fn_with_state(
                limiter.clone(),
                limit_requests::<MemoryRateLimitStore>,
            ));
        }

        route = route.layer(from_fn_with_state(
            PathMethodRule {
                path,
                method,
                renderer: self.renderer,
            },
            validate_path_method,
        ));

        if self.error_pages {
            route = route.layer(from_fn_with_state(
                ErrorPageState {
                    renderer: self.renderer,
                },
                render_error_pages,
            ));
        }

        route.layer(from_fn(apply_cors)).layer(from_fn(set_csp_headers))
    }
}
