//! Session Service
//!
//! Creates, resolves and destroys server-side sessions.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::domain::entity::session::{Session, now_ms};
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::session_token::SessionToken;
use crate::error::AuthResult;

/// A freshly created session and the `Set-Cookie` value that carries it
#[derive(Debug)]
pub struct IssuedSession {
    pub session: Session,
    pub set_cookie: String,
}

pub struct SessionService<S>
where
    S: SessionRepository,
{
    repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SessionService<S>
where
    S: SessionRepository,
{
    pub fn new(repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Create a session for `user_id`.
    ///
    /// With `single_session_per_user`, the user's previous sessions are removed first.
    pub async fn create(&self, user_id: UserId) -> AuthResult<IssuedSession> {
        if self.config.single_session_per_user {
            let replaced = self.repo.delete_sessions_for_user(user_id).await?;
            if replaced > 0 {
                tracing::debug!(user_id = %user_id, replaced, "Replaced previous sessions");
            }
        }

        let session = Session::issue(user_id, self.config.session_ttl, now_ms());
        self.repo.insert_session(&session).await?;

        tracing::info!(user_id = %user_id, "Session created");

        let set_cookie = self
            .config
            .session_cookie()
            .build_set_cookie(session.token.as_str());

        Ok(IssuedSession {
            session,
            set_cookie,
        })
    }

    /// Resolve a cookie value to a live session.
    ///
    /// An expired row is deleted on sight.
    pub async fn lookup(&self, raw_token: &str) -> AuthResult<Option<Session>> {
        if raw_token.is_empty() {
            return Ok(None);
        }

        let token = SessionToken::from_raw(raw_token);
        let Some(session) = self.repo.find_session(&token).await? else {
            return Ok(None);
        };

        if session.is_expired_at(now_ms()) {
            self.repo.delete_session(&token).await?;
            tracing::debug!(user_id = %session.user_id, "Expired session removed");
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Delete the session if it exists. Returns the cookie-clearing `Set-Cookie` value.
    pub async fn destroy(&self, raw_token: &str) -> AuthResult<String> {
        if !raw_token.is_empty() {
            let token = SessionToken::from_raw(raw_token);
            if self.repo.delete_session(&token).await? {
                tracing::info!("Session destroyed");
            }
        }
        Ok(self.clear_cookie())
    }

    pub async fn destroy_all_for_user(&self, user_id: UserId) -> AuthResult<u64> {
        self.repo.delete_sessions_for_user(user_id).await
    }

    /// Remove every expired session
    pub async fn sweep(&self) -> AuthResult<u64> {
        self.repo.delete_expired_sessions(now_ms()).await
    }

    pub fn clear_cookie(&self) -> String {
        self.config.session_cookie().build_delete_cookie()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::repository::SessionRepository;
    use crate::infra::memory::MemoryAuthRepository;

    fn service(config: AuthConfig) -> (Arc<MemoryAuthRepository>, SessionService<MemoryAuthRepository>) {
        let repo = Arc::new(MemoryAuthRepository::new());
        let service = SessionService::new(repo.clone(), Arc::new(config));
        (repo, service)
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let (_, service) = service(AuthConfig::default());
        let issued = service.create(UserId::new(7)).await.unwrap();

        assert!(issued.set_cookie.starts_with("session_token="));
        assert!(issued.set_cookie.contains(issued.session.token.as_str()));

        let found = service
            .lookup(issued.session.token.as_str())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user_id, UserId::new(7));
    }

    #[tokio::test]
    async fn test_lookup_unknown_or_empty() {
        let (_, service) = service(AuthConfig::default());
        assert!(service.lookup("").await.unwrap().is_none());
        assert!(service.lookup("no-such-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_single_session_per_user() {
        let (_, service) = service(AuthConfig::default());
        let first = service.create(UserId::new(1)).await.unwrap();
        let second = service.create(UserId::new(1)).await.unwrap();

        assert!(service.lookup(first.session.token.as_str()).await.unwrap().is_none());
        assert!(service.lookup(second.session.token.as_str()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_multiple_sessions_when_allowed() {
        let config = AuthConfig {
            single_session_per_user: false,
            ..Default::default()
        };
        let (_, service) = service(config);
        let first = service.create(UserId::new(1)).await.unwrap();
        let _second = service.create(UserId::new(1)).await.unwrap();

        assert!(service.lookup(first.session.token.as_str()).await.unwrap().is_some());
        assert_eq!(service.destroy_all_for_user(UserId::new(1)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_destroy_all_for_user_invalidates_lookups() {
        let config = AuthConfig {
            single_session_per_user: false,
            ..Default::default()
        };
        let (_, service) = service(config);
        let first = service.create(UserId::new(1)).await.unwrap();
        let second = service.create(UserId::new(1)).await.unwrap();
        let other = service.create(UserId::new(2)).await.unwrap();

        service.destroy_all_for_user(UserId::new(1)).await.unwrap();

        assert!(service.lookup(first.session.token.as_str()).await.unwrap().is_none());
        assert!(service.lookup(second.session.token.as_str()).await.unwrap().is_none());
        // other users keep their sessions
        let kept = service.lookup(other.session.token.as_str()).await.unwrap().unwrap();
        assert_eq!(kept.user_id, UserId::new(2));
    }

    #[tokio::test]
    async fn test_expired_session_removed_on_lookup() {
        let (repo, service) = service(AuthConfig::default());
        let session = Session::issue(UserId::new(3), Duration::from_millis(1), now_ms() - 1_000);
        repo.insert_session(&session).await.unwrap();

        assert!(service.lookup(session.token.as_str()).await.unwrap().is_none());
        assert!(repo.find_session(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let (_, service) = service(AuthConfig::default());
        let issued = service.create(UserId::new(1)).await.unwrap();
        let token = issued.session.token.as_str().to_string();

        let cookie = service.destroy(&token).await.unwrap();
        assert!(cookie.contains("Max-Age=0"));
        assert!(service.lookup(&token).await.unwrap().is_none());

        // second logout with the same cookie is harmless
        assert!(service.destroy(&token).await.is_ok());
        assert!(service.destroy("").await.is_ok());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let (repo, service) = service(AuthConfig::default());
        let expired = Session::issue(UserId::new(1), Duration::from_millis(1), now_ms() - 1_000);
        repo.insert_session(&expired).await.unwrap();
        let live = service.create(UserId::new(2)).await.unwrap();

        assert_eq!(service.sweep().await.unwrap(), 1);
        assert!(service.lookup(live.session.token.as_str()).await.unwrap().is_some());
    }
}
