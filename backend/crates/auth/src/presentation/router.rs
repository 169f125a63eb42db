//! Auth Router

use axum::{Extension, Router, http::Method, middleware::from_fn_with_state, routing::any};
use platform::middleware::RouteChain;

use crate::domain::identity_provider::{IdentityProvider, ProviderKind};
use crate::domain::repository::{CsrfRepository, SessionRepository, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_session_cookie, verify_csrf};

/// Middleware stacks for the three classes of auth routes
#[derive(Clone)]
pub struct AuthRouteChains {
    /// `/register`, `/login`
    pub credentials: RouteChain,
    /// `/logout`, `/check_login`, `/login_Page`
    pub pages: RouteChain,
    /// Provider redirects and callbacks
    pub oauth: RouteChain,
}

fn oauth_paths(kind: ProviderKind) -> (&'static str, &'static str) {
    match kind {
        ProviderKind::Google => ("/auth/google", "/auth/google/callback"),
        ProviderKind::Github => ("/auth/github", "/auth/github/callback"),
    }
}

/// Create the Auth router for any repository and identity provider implementation
pub fn auth_router<R, P>(state: AuthAppState<R, P>, chains: &AuthRouteChains) -> Router
where
    R: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let credentials = &chains.credentials;
    let pages = &chains.pages;

    let csrf_state = AuthMiddlewareState {
        repo: state.repo.clone(),
        config: state.config.clone(),
    };
    // cookie presence outside, CSRF check inside
    let logout = any(handlers::logout::<R, P>)
        .layer(from_fn_with_state(csrf_state.clone(), verify_csrf::<R>))
        .layer(from_fn_with_state(csrf_state, require_session_cookie::<R>));

    let mut router = Router::new()
        .route(
            "/register",
            credentials.wrap("/register", Method::POST, any(handlers::register::<R, P>)),
        )
        .route(
            "/login",
            credentials.wrap("/login", Method::POST, any(handlers::login::<R, P>)),
        )
        .route(
            "/logout",
            pages.wrap("/logout", Method::POST, logout),
        )
        .route(
            "/check_login",
            pages.wrap("/check_login", Method::GET, any(handlers::check_login::<R, P>)),
        )
        .route(
            "/login_Page",
            pages.wrap("/login_Page", Method::GET, any(handlers::login_page::<R, P>)),
        );

    for kind in ProviderKind::ALL {
        let (start, callback) = oauth_paths(kind);
        router = router
            .route(
                start,
                chains.oauth.wrap(
                    start,
                    Method::GET,
                    any(handlers::oauth_start::<R, P>).layer(Extension(kind)),
                ),
            )
            .route(
                callback,
                chains.oauth.wrap(
                    callback,
                    Method::GET,
                    any(handlers::oauth_callback::<R, P>).layer(Extension(kind)),
                ),
            );
    }

    router.with_state(state)
}
