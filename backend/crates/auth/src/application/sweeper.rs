//! Background sweepers for expired sessions and CSRF tokens

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::entity::session::now_ms;
use crate::domain::repository::{CsrfRepository, SessionRepository};

/// Handles to the running sweepers
pub struct SweeperHandles {
    cancel: CancellationToken,
    sessions: JoinHandle<()>,
    csrf: JoinHandle<()>,
}

impl SweeperHandles {
    /// Cancel both sweepers and wait for them to exit
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.sessions.await {
            tracing::error!(error = %e, "Session sweeper task failed");
        }
        if let Err(e) = self.csrf.await {
            tracing::error!(error = %e, "CSRF sweeper task failed");
        }
    }
}

/// One sweep of both tables. Returns `(sessions, csrf_tokens)` removed.
///
/// Failures are logged, not returned; the next sweep retries.
pub async fn sweep_expired<R>(repo: &R) -> (u64, u64)
where
    R: SessionRepository + CsrfRepository + Sync,
{
    let now = now_ms();

    let sessions = repo.delete_expired_sessions(now).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Session sweep failed");
        0
    });
    let csrf = repo.delete_expired_csrf_tokens(now).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "CSRF sweep failed");
        0
    });

    (sessions, csrf)
}

/// Spawn one sweeper per table, each running every `period` until `cancel` fires.
pub fn spawn_sweepers<R>(repo: Arc<R>, period: Duration, cancel: CancellationToken) -> SweeperHandles
where
    R: SessionRepository + CsrfRepository + Send + Sync + 'static,
{
    let sessions = {
        let repo = repo.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // 最初の tick は即時に返るので捨てる
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        match repo.delete_expired_sessions(now_ms()).await {
                            Ok(0) => {}
                            Ok(removed) => tracing::info!(removed, "Expired sessions swept"),
                            Err(e) => tracing::error!(error = %e, "Session sweep failed"),
                        }
                    }
                }
            }
            tracing::debug!("Session sweeper stopped");
        })
    };

    let csrf = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        match repo.delete_expired_csrf_tokens(now_ms()).await {
                            Ok(0) => {}
                            Ok(removed) => tracing::info!(removed, "Expired CSRF tokens swept"),
                            Err(e) => tracing::error!(error = %e, "CSRF sweep failed"),
                        }
                    }
                }
            }
            tracing::debug!("CSRF sweeper stopped");
        })
    };

    SweeperHandles {
        cancel,
        sessions,
        csrf,
    }
}
