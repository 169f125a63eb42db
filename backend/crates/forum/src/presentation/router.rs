//! Forum Router

use auth::domain::repository::{CsrfRepository, SessionRepository};
use auth::presentation::{require_session, verify_csrf};
use axum::{Router, http::Method, middleware::from_fn_with_state, routing::any};
use platform::middleware::RouteChain;

use crate::domain::repository::{PostRepository, VoteRepository};
use crate::presentation::handlers::{self, ForumAppState};

#[derive(Clone)]
pub struct ForumRouteChains {
    /// `/`
    pub home: RouteChain,
    /// `/likePost`
    pub votes: RouteChain,
}

pub fn forum_router<F, A>(state: ForumAppState<F, A>, chains: &ForumRouteChains) -> Router
where
    F: PostRepository + VoteRepository + Send + Sync + 'static,
    A: SessionRepository + CsrfRepository + Send + Sync + 'static,
{
    // session gate outside, CSRF check inside
    let like_post = any(handlers::like_post::<F, A>)
        .layer(from_fn_with_state(state.auth.clone(), verify_csrf::<A>))
        .layer(from_fn_with_state(state.auth.clone(), require_session::<A>));

    Router::new()
        .route("/", chains.home.wrap("/", Method::GET, any(handlers::home::<F, A>)))
        .route(
            "/likePost",
            chains.votes.wrap("/likePost", Method::POST, like_post),
        )
        .with_state(state)
}
