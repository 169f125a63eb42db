//! Router composition

use std::sync::Arc;
use std::time::Duration;

use auth::application::AuthConfig;
use auth::domain::identity_provider::{IdentityProvider, ProviderRegistry};
use auth::domain::repository::{CsrfRepository, SessionRepository, UserRepository};
use auth::presentation::{AuthAppState, AuthMiddlewareState};
use auth::{AuthRouteChains, auth_router};
use axum::{Router, middleware::from_fn, routing::any};
use forum::domain::repository::{PostRepository, VoteRepository};
use forum::{ForumAppState, ForumRouteChains, forum_router, render_error_page};
use platform::middleware::csp::set_csp_headers;
use platform::middleware::error_page::error_page_response;
use platform::middleware::rate_limit::RateLimitState;
use platform::middleware::{ErrorPage, RouteChain};
use platform::rate_limit::{MemoryRateLimitStore, RateLimitConfig};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::config::{RateLimitSettings, ServerConfig};

/// How often idle visitors are evicted from the limiter stores
pub const LIMITER_CLEAN_PERIOD: Duration = Duration::from_secs(60);

/// One store per limiter class
#[derive(Clone)]
pub struct RateLimiters {
    pub auth: RateLimitState<MemoryRateLimitStore>,
    pub page: RateLimitState<MemoryRateLimitStore>,
    pub vote: RateLimitState<MemoryRateLimitStore>,
}

impl RateLimiters {
    pub fn new(settings: &RateLimitSettings) -> Self {
        let class = |config: &RateLimitConfig| {
            // a visitor idle for a whole window starts over anyway
            RateLimitState::new(
                Arc::new(MemoryRateLimitStore::new(config.window)),
                config.clone(),
            )
            .trust_forwarded(settings.trust_forwarded)
        };

        Self {
            auth: class(&settings.auth),
            page: class(&settings.page),
            vote: class(&settings.vote),
        }
    }

    pub fn spawn_cleaners(&self, period: Duration, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        [&self.auth, &self.page, &self.vote]
            .into_iter()
            .map(|limiter| limiter.store.spawn_cleaner(period, cancel.clone()))
            .collect()
    }
}

/// Everything the router needs besides the configuration
pub struct AppServices<A, F, P>
where
    A: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    F: PostRepository + VoteRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    pub auth_repo: Arc<A>,
    pub forum_repo: Arc<F>,
    pub providers: ProviderRegistry<P>,
    pub limiters: RateLimiters,
}

/// Auth and forum routes, the 404 fallback and request tracing
pub fn build_router<A, F, P>(config: &ServerConfig, services: AppServices<A, F, P>) -> Router
where
    A: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    F: PostRepository + VoteRepository + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
{
    let auth_config: Arc<AuthConfig> = Arc::new(config.auth.clone());
    let limiters = &services.limiters;

    let base = RouteChain::new(render_error_page, config.request_timeout);
    let pages = base.clone().with_limiter(limiters.page.clone());

    let auth_chains = AuthRouteChains {
        credentials: base.clone().with_limiter(limiters.auth.clone()),
        pages: pages.clone(),
        oauth: base.clone().with_timeout(config.oauth_timeout),
    };
    let forum_chains = ForumRouteChains {
        home: pages,
        votes: base
            .with_limiter(limiters.vote.clone())
            .without_error_pages(),
    };

    let auth_state = AuthAppState {
        repo: services.auth_repo.clone(),
        config: auth_config.clone(),
        providers: services.providers,
    };
    let forum_state = ForumAppState {
        forum: services.forum_repo,
        auth: AuthMiddlewareState {
            repo: services.auth_repo,
            config: auth_config,
        },
    };

    let not_found = any(|| async { error_page_response(render_error_page, &ErrorPage::NOT_FOUND) })
        .layer(from_fn(set_csp_headers));

    Router::new()
        .merge(auth_router(auth_state, &auth_chains))
        .merge(forum_router(forum_state, &forum_chains))
        .fallback_service(not_found)
        .layer(TraceLayer::new_for_http())
}
