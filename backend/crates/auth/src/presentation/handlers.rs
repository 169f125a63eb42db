//! HTTP Handlers

use std::sync::Arc;

use axum::Extension;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use platform::cookie::extract_cookie;
use platform::password::ClearTextPassword;

use crate::application::{
    AuthConfig, IssuedSession, LoginInput, LoginUseCase, OAuthLoginUseCase, RegisterInput,
    RegisterUseCase, SessionService,
};
use crate::domain::identity_provider::{IdentityProvider, ProviderKind, ProviderRegistry};
use crate::domain::repository::{CsrfRepository, SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    LoginRequest, MessageResponse, OAuthCallbackQuery, RedirectResponse, RegisterRequest,
};
use crate::presentation::pages;

/// Shared state for auth handlers
pub struct AuthAppState<R, P>
where
    R: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub providers: ProviderRegistry<P>,
}

impl<R, P> Clone for AuthAppState<R, P>
where
    R: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
            providers: self.providers.clone(),
        }
    }
}

impl<R, P> AuthAppState<R, P>
where
    R: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    fn sessions(&self) -> SessionService<R> {
        SessionService::new(self.repo.clone(), self.config.clone())
    }

    fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        extract_cookie(headers, &self.config.session_cookie_name)
    }
}

/// `302` with the session cookie and `{"redirect":"/"}`
fn signed_in(issued: IssuedSession) -> Response {
    (
        StatusCode::FOUND,
        [(header::SET_COOKIE, issued.set_cookie)],
        Json(RedirectResponse {
            redirect: "/".to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Credentials
// ============================================================================

/// POST /register
pub async fn register<R, P>(
    State(state): State<AuthAppState<R, P>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<Response>
where
    R: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(|_| AuthError::InvalidInput)?;

    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());
    let issued = use_case
        .execute(RegisterInput {
            email: req.email,
            username: req.username,
            password: ClearTextPassword::new(req.password),
        })
        .await?;

    Ok(signed_in(issued))
}

/// POST /login
pub async fn login<R, P>(
    State(state): State<AuthAppState<R, P>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Response>
where
    R: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(|_| AuthError::InvalidInput)?;

    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());
    let issued = use_case
        .execute(LoginInput {
            username: req.username,
            password: ClearTextPassword::new(req.password),
        })
        .await?;

    Ok(signed_in(issued))
}

// ============================================================================
// Session
// ============================================================================

/// POST /logout
pub async fn logout<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let token = state
        .session_cookie(&headers)
        .ok_or(AuthError::NoActiveSession)?;

    let cookie = state.sessions().destroy(&token).await?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::new("User is logged out successfully")),
    )
        .into_response())
}

/// GET /check_login
pub async fn check_login<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let token = state.session_cookie(&headers).unwrap_or_default();

    match state.sessions().lookup(&token).await? {
        Some(_) => Ok(Json(MessageResponse::new("User is logged in"))),
        None => Err(AuthError::SessionInvalid),
    }
}

/// GET /login_Page
pub async fn login_page<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let token = state.session_cookie(&headers).unwrap_or_default();

    if state.sessions().lookup(&token).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(Html(pages::login_page(
        state.providers.is_enabled(ProviderKind::Google),
        state.providers.is_enabled(ProviderKind::Github),
    ))
    .into_response())
}

// ============================================================================
// Identity providers
// ============================================================================

/// GET /auth/{provider}
pub async fn oauth_start<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Extension(kind): Extension<ProviderKind>,
) -> AuthResult<Response>
where
    R: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let provider = state
        .providers
        .get(kind)
        .ok_or(AuthError::ProviderDisabled)?;

    let url = provider.authorize_url()?;

    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}

/// GET /auth/{provider}/callback
pub async fn oauth_callback<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Extension(kind): Extension<ProviderKind>,
    query: Result<Query<OAuthCallbackQuery>, QueryRejection>,
) -> AuthResult<Response>
where
    R: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let Query(query) = query.map_err(|_| AuthError::InvalidInput)?;

    let provider = state
        .providers
        .get(kind)
        .ok_or(AuthError::ProviderDisabled)?;

    if let Some(error) = &query.error {
        tracing::warn!(provider = %kind, error = %error, "Provider returned an error");
    }

    let use_case = OAuthLoginUseCase::new(state.repo.clone(), provider, state.config.clone());
    let issued = use_case.execute(query.code.as_deref()).await?;

    Ok((
        [(header::SET_COOKIE, issued.set_cookie)],
        Html(pages::oauth_complete_page()),
    )
        .into_response())
}
