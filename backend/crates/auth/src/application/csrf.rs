//! CSRF Service
//!
//! One anti-forgery token per session, checked on every state-changing request.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session::SessionService;
use crate::domain::entity::{csrf_token::CsrfToken, session::now_ms};
use crate::domain::repository::{CsrfRepository, SessionRepository};
use crate::domain::value_object::session_token::SessionToken;
use crate::error::{AuthError, AuthResult};

pub struct CsrfService<R>
where
    R: SessionRepository + CsrfRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> CsrfService<R>
where
    R: SessionRepository + CsrfRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Issue a token for the session, replacing any previous one.
    ///
    /// Fails with `SessionInvalid` when the session is unknown or expired.
    pub async fn issue(&self, raw_session_token: &str) -> AuthResult<String> {
        let session = SessionService::new(self.repo.clone(), self.config.clone())
            .lookup(raw_session_token)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        let token = CsrfToken::issue_for(&session, self.config.csrf_ttl, now_ms());
        self.repo.upsert_csrf_token(&token).await?;

        Ok(token.value.as_str().to_string())
    }

    /// True only when the session is live and `candidate` equals its unexpired token.
    ///
    /// A mismatching or expired token is deleted, so the page must fetch a new one.
    pub async fn verify(
        &self,
        candidate: Option<&str>,
        raw_session_token: Option<&str>,
    ) -> AuthResult<bool> {
        let (Some(candidate), Some(raw_session_token)) = (candidate, raw_session_token) else {
            return Ok(false);
        };
        if candidate.is_empty() {
            return Ok(false);
        }

        let session = SessionService::new(self.repo.clone(), self.config.clone())
            .lookup(raw_session_token)
            .await?;
        if session.is_none() {
            return Ok(false);
        }

        let session_token = SessionToken::from_raw(raw_session_token);
        let Some(stored) = self.repo.find_csrf_token(&session_token).await? else {
            return Ok(false);
        };

        if !stored.is_expired_at(now_ms()) && stored.value.matches(candidate) {
            return Ok(true);
        }

        self.repo.delete_csrf_token(&session_token).await?;
        Ok(false)
    }

    pub async fn revoke(&self, raw_session_token: &str) -> AuthResult<()> {
        self.repo
            .delete_csrf_token(&SessionToken::from_raw(raw_session_token))
            .await?;
        Ok(())
    }

    /// Remove every expired token
    pub async fn sweep(&self) -> AuthResult<u64> {
        self.repo.delete_expired_csrf_tokens(now_ms()).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use kernel::id::UserId;

    use super::*;
    use crate::domain::entity::session::Session;
    use crate::infra::memory::MemoryAuthRepository;

    struct Fixture {
        repo: Arc<MemoryAuthRepository>,
        sessions: SessionService<MemoryAuthRepository>,
        csrf: CsrfService<MemoryAuthRepository>,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::default());
        Fixture {
            sessions: SessionService::new(repo.clone(), config.clone()),
            csrf: CsrfService::new(repo.clone(), config),
            repo,
        }
    }

    #[tokio::test]
    async fn test_issue_and_verify() {
        let f = fixture();
        let session = f.sessions.create(UserId::new(1)).await.unwrap().session;
        let token = f.csrf.issue(session.token.as_str()).await.unwrap();

        assert!(f.csrf.verify(Some(&token), Some(session.token.as_str())).await.unwrap());
        // still valid, verification does not consume it
        assert!(f.csrf.verify(Some(&token), Some(session.token.as_str())).await.unwrap());
    }

    #[tokio::test]
    async fn test_issue_requires_live_session() {
        let f = fixture();
        assert!(matches!(
            f.csrf.issue("unknown").await,
            Err(AuthError::SessionInvalid)
        ));
    }

    #[tokio::test]
    async fn test_reissue_replaces_previous() {
        let f = fixture();
        let session = f.sessions.create(UserId::new(1)).await.unwrap().session;
        let first = f.csrf.issue(session.token.as_str()).await.unwrap();
        let second = f.csrf.issue(session.token.as_str()).await.unwrap();

        assert_ne!(first, second);
        assert!(!f.csrf.verify(Some(&first), Some(session.token.as_str())).await.unwrap());
    }

    #[tokio::test]
    async fn test_mismatch_deletes_token() {
        let f = fixture();
        let session = f.sessions.create(UserId::new(1)).await.unwrap().session;
        let token = f.csrf.issue(session.token.as_str()).await.unwrap();

        assert!(!f.csrf.verify(Some("forged"), Some(session.token.as_str())).await.unwrap());
        assert!(!f.csrf.verify(Some(&token), Some(session.token.as_str())).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_inputs() {
        let f = fixture();
        let session = f.sessions.create(UserId::new(1)).await.unwrap().session;
        let token = f.csrf.issue(session.token.as_str()).await.unwrap();

        assert!(!f.csrf.verify(None, Some(session.token.as_str())).await.unwrap());
        assert!(!f.csrf.verify(Some(""), Some(session.token.as_str())).await.unwrap());
        assert!(!f.csrf.verify(Some(&token), None).await.unwrap());
    }

    #[tokio::test]
    async fn test_token_of_other_session_rejected() {
        let f = fixture();
        let alice = f.sessions.create(UserId::new(1)).await.unwrap().session;
        let bob = f.sessions.create(UserId::new(2)).await.unwrap().session;
        let alice_token = f.csrf.issue(alice.token.as_str()).await.unwrap();
        f.csrf.issue(bob.token.as_str()).await.unwrap();

        assert!(!f.csrf.verify(Some(&alice_token), Some(bob.token.as_str())).await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let f = fixture();
        let session = f.sessions.create(UserId::new(1)).await.unwrap().session;
        let token = f.csrf.issue(session.token.as_str()).await.unwrap();

        f.sessions.destroy(session.token.as_str()).await.unwrap();
        assert!(!f.csrf.verify(Some(&token), Some(session.token.as_str())).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_token_rejected_and_swept() {
        let f = fixture();
        let session = f.sessions.create(UserId::new(1)).await.unwrap().session;
        let expired = CsrfToken::issue_for(&session, Duration::from_millis(1), now_ms() - 1_000);
        f.repo.upsert_csrf_token(&expired).await.unwrap();

        assert_eq!(f.csrf.sweep().await.unwrap(), 1);
        assert!(!f
            .csrf
            .verify(Some(expired.value.as_str()), Some(session.token.as_str()))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_expired_session_rejects_token() {
        let f = fixture();
        let session = Session::issue(UserId::new(1), Duration::from_millis(1), now_ms() - 1_000);
        f.repo.insert_session(&session).await.unwrap();
        let token = CsrfToken::issue_for(&session, Duration::from_secs(3600), now_ms() - 1_000);
        f.repo.upsert_csrf_token(&token).await.unwrap();

        assert!(!f
            .csrf
            .verify(Some(token.value.as_str()), Some(session.token.as_str()))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_revoke() {
        let f = fixture();
        let session = f.sessions.create(UserId::new(1)).await.unwrap().session;
        let token = f.csrf.issue(session.token.as_str()).await.unwrap();

        f.csrf.revoke(session.token.as_str()).await.unwrap();
        assert!(!f.csrf.verify(Some(&token), Some(session.token.as_str())).await.unwrap());
    }
}
