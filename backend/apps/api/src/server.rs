//! Storage selection, background workers and the HTTP server lifecycle

use std::net::SocketAddr;
use std::sync::Arc;

use auth::application::{spawn_sweepers, sweep_expired};
use auth::domain::repository::{CsrfRepository, SessionRepository, UserRepository};
use auth::infra::oauth::registry_from_config;
use auth::{HttpIdentityProvider, MemoryAuthRepository, PgAuthRepository};
use forum::domain::repository::{PostRepository, VoteRepository};
use forum::{MemoryForumRepository, PgForumRepository};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::app::{AppServices, LIMITER_CLEAN_PERIOD, RateLimiters, build_router};
use crate::config::ServerConfig;
use crate::shutdown::shutdown_signal;

/// Run until SIGINT/SIGTERM, then stop every background worker.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url.expose_secret())
                .await?;

            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            serve(
                &config,
                Arc::new(PgAuthRepository::new(pool.clone())),
                Arc::new(PgForumRepository::new(pool)),
            )
            .await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage; data is lost on restart");
            serve(
                &config,
                Arc::new(MemoryAuthRepository::new()),
                Arc::new(MemoryForumRepository::new()),
            )
            .await
        }
    }
}

async fn serve<A, F>(config: &ServerConfig, auth_repo: Arc<A>, forum_repo: Arc<F>) -> anyhow::Result<()>
where
    A: UserRepository + SessionRepository + CsrfRepository + Send + Sync + 'static,
    F: PostRepository + VoteRepository + Send + Sync + 'static,
{
    // Startup cleanup; failures are logged inside and never block startup
    let (sessions, csrf_tokens) = sweep_expired(auth_repo.as_ref()).await;
    tracing::info!(
        sessions_deleted = sessions,
        csrf_tokens_deleted = csrf_tokens,
        "Startup sweep completed"
    );

    let providers = registry_from_config(&config.oauth)?;
    let limiters = RateLimiters::new(&config.rate_limits);

    let cancel = CancellationToken::new();
    let sweepers = spawn_sweepers(auth_repo.clone(), config.auth.sweep_interval, cancel.clone());
    let cleaners = limiters.spawn_cleaners(LIMITER_CLEAN_PERIOD, &cancel);

    let app = build_router::<A, F, HttpIdentityProvider>(
        config,
        AppServices {
            auth_repo,
            forum_repo,
            providers,
            limiters,
        },
    );

    tracing::info!("Listening on {}", config.listen_addr);

    let listener = TcpListener::bind(config.listen_addr).await?;
    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    cancel.cancel();
    sweepers.stop().await;
    for cleaner in cleaners {
        if let Err(e) = cleaner.await {
            tracing::error!(error = %e, "Rate limit cleaner task failed");
        }
    }

    tracing::info!("Background workers stopped");

    served?;
    Ok(())
}
