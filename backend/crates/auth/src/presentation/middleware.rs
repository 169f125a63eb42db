//! Auth Middleware
//!
//! Session gate for protected routes and CSRF verification for
//! state-changing requests.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use kernel::id::UserId;
use platform::cookie::extract_cookie;

use crate::application::{AuthConfig, CsrfService, SessionService};
use crate::domain::repository::{CsrfRepository, SessionRepository};
use crate::domain::value_object::session_token::SessionToken;
use crate::error::AuthError;

/// Where the gate sends anonymous visitors
pub const LOGIN_PAGE_PATH: &str = "/login_Page";

/// Request header carrying the CSRF token
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Form field carrying the CSRF token
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// Largest form body buffered while looking for the CSRF field
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Middleware state
pub struct AuthMiddlewareState<R>
where
    R: SessionRepository + CsrfRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthMiddlewareState<R>
where
    R: SessionRepository + CsrfRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

/// Authenticated principal, inserted into request extensions by [`require_session`]
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub session_token: SessionToken,
}

/// Middleware that requires a valid session.
///
/// Anonymous requests get `303 See Other` to the login page.
pub async fn require_session<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: SessionRepository + CsrfRepository + Send + Sync + 'static,
{
    let Some(token) = extract_cookie(req.headers(), &state.config.session_cookie_name) else {
        return Redirect::to(LOGIN_PAGE_PATH).into_response();
    };

    let session = match SessionService::new(state.repo.clone(), state.config.clone())
        .lookup(&token)
        .await
    {
        Ok(Some(session)) => session,
        Ok(None) => return Redirect::to(LOGIN_PAGE_PATH).into_response(),
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(CurrentUser {
        user_id: session.user_id,
        session_token: session.token,
    });

    next.run(req).await
}

/// Middleware that answers `401 No active session` when the request carries
/// no session cookie. Used where an anonymous caller gets an error instead
/// of the login redirect.
pub async fn require_session_cookie<R>(
    State(state): State<AuthMiddlewareState<R>>,
    req: Request,
    next: Next,
) -> Response
where
    R: SessionRepository + CsrfRepository + Send + Sync + 'static,
{
    if extract_cookie(req.headers(), &state.config.session_cookie_name).is_none() {
        return AuthError::NoActiveSession.into_response();
    }

    next.run(req).await
}

/// Middleware that rejects state-changing requests without the session's CSRF token.
///
/// The token is read from the `X-CSRF-Token` header, or else from the
/// `csrf_token` field of a urlencoded form body. Safe methods pass through.
pub async fn verify_csrf<R>(
    State(state): State<AuthMiddlewareState<R>>,
    req: Request,
    next: Next,
) -> Response
where
    R: SessionRepository + CsrfRepository + Send + Sync + 'static,
{
    if is_safe_method(req.method()) {
        return next.run(req).await;
    }

    let session_token = extract_cookie(req.headers(), &state.config.session_cookie_name);

    let (candidate, req) = match header_token(req.headers()) {
        Some(token) => (Some(token), req),
        None if is_form(req.headers()) => {
            let (parts, body) = req.into_parts();
            let Ok(bytes) = to_bytes(body, MAX_FORM_BYTES).await else {
                return AuthError::CsrfInvalid.into_response();
            };
            let token = url::form_urlencoded::parse(&bytes)
                .find(|(key, _)| key == CSRF_FORM_FIELD)
                .map(|(_, value)| value.into_owned());
            (token, Request::from_parts(parts, Body::from(bytes)))
        }
        None => (None, req),
    };

    let verified = CsrfService::new(state.repo.clone(), state.config.clone())
        .verify(candidate.as_deref(), session_token.as_deref())
        .await;

    match verified {
        Ok(true) => next.run(req).await,
        Ok(false) => AuthError::CsrfInvalid.into_response(),
        Err(e) => e.into_response(),
    }
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}
