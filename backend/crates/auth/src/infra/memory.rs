//! In-memory repository
//!
//! Same contract as the PostgreSQL repository, including the session-to-CSRF
//! cascade. Sessions are not checked against the user table.
//! Used when no database is configured and in tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use kernel::id::UserId;

use crate::domain::entity::{
    csrf_token::CsrfToken,
    session::Session,
    user::{NewUser, User},
};
use crate::domain::repository::{CsrfRepository, SessionRepository, UserRepository};
use crate::domain::value_object::session_token::SessionToken;
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct MemoryState {
    last_user_id: i64,
    users: BTreeMap<i64, User>,
    sessions: HashMap<String, Session>,
    csrf_tokens: HashMap<String, CsrfToken>,
}

impl MemoryState {
    fn remove_sessions_where(&mut self, predicate: impl Fn(&Session) -> bool) -> u64 {
        let doomed: Vec<String> = self
            .sessions
            .iter()
            .filter(|(_, session)| predicate(session))
            .map(|(token, _)| token.clone())
            .collect();

        for token in &doomed {
            self.sessions.remove(token);
            self.csrf_tokens.remove(token);
        }

        doomed.len() as u64
    }
}

#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // The lock is never held across an await; a poisoned lock still holds consistent maps.
    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn session_count(&self) -> usize {
        self.read().sessions.len()
    }

    pub fn csrf_token_count(&self) -> usize {
        self.read().csrf_tokens.len()
    }
}

impl UserRepository for MemoryAuthRepository {
    async fn insert_user(&self, user: &NewUser) -> AuthResult<User> {
        let mut state = self.write();

        let taken = state
            .users
            .values()
            .any(|existing| existing.email == user.email || existing.username == user.username);
        if taken {
            return Err(AuthError::UserTaken);
        }

        state.last_user_id += 1;
        let created = User {
            id: UserId::new(state.last_user_id),
            email: user.email.clone(),
            username: user.username.clone(),
            password: user.password.clone(),
        };
        state.users.insert(created.id.get(), created.clone());

        Ok(created)
    }

    async fn find_user_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.read().users.get(&user_id.get()).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        Ok(self
            .read()
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        Ok(self
            .read()
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }
}

impl SessionRepository for MemoryAuthRepository {
    async fn insert_session(&self, session: &Session) -> AuthResult<()> {
        let mut state = self.write();

        if state.sessions.contains_key(session.token.as_str()) {
            return Err(AuthError::Internal("duplicate session token".to_string()));
        }

        state
            .sessions
            .insert(session.token.as_str().to_string(), session.clone());
        Ok(())
    }

    async fn find_session(&self, token: &SessionToken) -> AuthResult<Option<Session>> {
        Ok(self.read().sessions.get(token.as_str()).cloned())
    }

    async fn delete_session(&self, token: &SessionToken) -> AuthResult<bool> {
        let mut state = self.write();
        state.csrf_tokens.remove(token.as_str());
        Ok(state.sessions.remove(token.as_str()).is_some())
    }

    async fn delete_sessions_for_user(&self, user_id: UserId) -> AuthResult<u64> {
        Ok(self
            .write()
            .remove_sessions_where(|session| session.user_id == user_id))
    }

    async fn delete_expired_sessions(&self, now_ms: i64) -> AuthResult<u64> {
        Ok(self
            .write()
            .remove_sessions_where(|session| session.expires_at_ms < now_ms))
    }
}

impl CsrfRepository for MemoryAuthRepository {
    async fn upsert_csrf_token(&self, token: &CsrfToken) -> AuthResult<()> {
        let mut state = self.write();

        let key = token.session_token.as_str();
        if !state.sessions.contains_key(key) {
            return Err(AuthError::Internal("CSRF token for unknown session".to_string()));
        }

        state.csrf_tokens.insert(key.to_string(), token.clone());
        Ok(())
    }

    async fn find_csrf_token(&self, session_token: &SessionToken) -> AuthResult<Option<CsrfToken>> {
        Ok(self.read().csrf_tokens.get(session_token.as_str()).cloned())
    }

    async fn delete_csrf_token(&self, session_token: &SessionToken) -> AuthResult<bool> {
        Ok(self
            .write()
            .csrf_tokens
            .remove(session_token.as_str())
            .is_some())
    }

    async fn delete_expired_csrf_tokens(&self, now_ms: i64) -> AuthResult<u64> {
        let mut state = self.write();
        let before = state.csrf_tokens.len();
        state
            .csrf_tokens
            .retain(|_, token| token.expires_at_ms >= now_ms);
        Ok((before - state.csrf_tokens.len()) as u64)
    }
}
