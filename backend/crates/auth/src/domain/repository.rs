//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::UserId;

use crate::domain::entity::{
    csrf_token::CsrfToken,
    session::Session,
    user::{NewUser, User},
};
use crate::domain::value_object::session_token::SessionToken;
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user. Fails with `UserTaken` if the email or username exists.
    async fn insert_user(&self, user: &NewUser) -> AuthResult<User>;

    async fn find_user_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AuthResult<Option<User>>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn insert_session(&self, session: &Session) -> AuthResult<()>;

    /// Find a session by token, expired or not
    async fn find_session(&self, token: &SessionToken) -> AuthResult<Option<Session>>;

    /// Delete a session and its CSRF token. Returns whether a row existed.
    async fn delete_session(&self, token: &SessionToken) -> AuthResult<bool>;

    /// Delete every session of a user. Returns the number removed.
    async fn delete_sessions_for_user(&self, user_id: UserId) -> AuthResult<u64>;

    /// Delete sessions with `expires_at_ms < now_ms`
    async fn delete_expired_sessions(&self, now_ms: i64) -> AuthResult<u64>;
}

/// CSRF token repository trait
#[trait_variant::make(CsrfRepository: Send)]
pub trait LocalCsrfRepository {
    /// Store the token for its session, replacing any previous one
    async fn upsert_csrf_token(&self, token: &CsrfToken) -> AuthResult<()>;

    async fn find_csrf_token(&self, session_token: &SessionToken) -> AuthResult<Option<CsrfToken>>;

    async fn delete_csrf_token(&self, session_token: &SessionToken) -> AuthResult<bool>;

    /// Delete tokens with `expires_at_ms < now_ms`
    async fn delete_expired_csrf_tokens(&self, now_ms: i64) -> AuthResult<u64>;
}
