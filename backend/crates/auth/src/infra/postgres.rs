//! PostgreSQL Repository Implementations

use kernel::error::conversions::PG_UNIQUE_VIOLATION;
use kernel::id::UserId;
use sqlx::PgPool;

use crate::domain::entity::{
    csrf_token::CsrfToken,
    session::Session,
    user::{NewUser, User},
};
use crate::domain::repository::{CsrfRepository, SessionRepository, UserRepository};
use crate::domain::value_object::{
    session_token::{CsrfTokenValue, SessionToken},
    user_password::StoredPassword,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(PG_UNIQUE_VIOLATION)
    )
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn insert_user(&self, user: &NewUser) -> AuthResult<User> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, username, password)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(user.password.as_stored())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::UserTaken
            } else {
                AuthError::Database(e)
            }
        })?;

        Ok(User {
            id: UserId::new(id),
            email: user.email.clone(),
            username: user.username.clone(),
            password: user.password.clone(),
        })
    }

    async fn find_user_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, username, password FROM users WHERE id = $1",
        )
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_user_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, username, password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_user_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, username, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn insert_session(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (session_token, user_id, expires_at_ms)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(session.token.as_str())
        .bind(session.user_id.get())
        .bind(session.expires_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, token: &SessionToken) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT session_token, user_id, expires_at_ms FROM sessions WHERE session_token = $1",
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }

    // csrf_tokens rows go with the session (ON DELETE CASCADE)
    async fn delete_session(&self, token: &SessionToken) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE session_token = $1")
            .bind(token.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn delete_sessions_for_user(&self, user_id: UserId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id.get())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_expired_sessions(&self, now_ms: i64) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// CSRF Repository Implementation
// ============================================================================

impl CsrfRepository for PgAuthRepository {
    async fn upsert_csrf_token(&self, token: &CsrfToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO csrf_tokens (session_token, csrf_token, expires_at_ms)
            VALUES ($1, $2, $3)
            ON CONFLICT (session_token) DO UPDATE
            SET csrf_token = EXCLUDED.csrf_token,
                expires_at_ms = EXCLUDED.expires_at_ms
            "#,
        )
        .bind(token.session_token.as_str())
        .bind(token.value.as_str())
        .bind(token.expires_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_csrf_token(&self, session_token: &SessionToken) -> AuthResult<Option<CsrfToken>> {
        let row = sqlx::query_as::<_, CsrfRow>(
            r#"
            SELECT session_token, csrf_token, expires_at_ms
            FROM csrf_tokens
            WHERE session_token = $1
            "#,
        )
        .bind(session_token.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CsrfRow::into_csrf_token))
    }

    async fn delete_csrf_token(&self, session_token: &SessionToken) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM csrf_tokens WHERE session_token = $1")
            .bind(session_token.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn delete_expired_csrf_tokens(&self, now_ms: i64) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM csrf_tokens WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    password: String,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: UserId::new(self.id),
            email: self.email,
            username: self.username,
            password: StoredPassword::from_stored(self.password),
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_token: String,
    user_id: i64,
    expires_at_ms: i64,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            token: SessionToken::from_raw(self.session_token),
            user_id: UserId::new(self.user_id),
            expires_at_ms: self.expires_at_ms,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CsrfRow {
    session_token: String,
    csrf_token: String,
    expires_at_ms: i64,
}

impl CsrfRow {
    fn into_csrf_token(self) -> CsrfToken {
        CsrfToken {
            session_token: SessionToken::from_raw(self.session_token),
            value: CsrfTokenValue::from_raw(self.csrf_token),
            expires_at_ms: self.expires_at_ms,
        }
    }
}
