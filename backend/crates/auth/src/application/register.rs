//! Register Use Case
//!
//! Validates a sign-up request, stores the account and logs it in.

use std::sync::Arc;

use platform::password::{ClearTextPassword, PasswordHasher};

use crate::application::config::AuthConfig;
use crate::application::session::{IssuedSession, SessionService};
use crate::domain::entity::user::NewUser;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    sanitize::sanitize,
    user_name::UserName,
    user_password::{StoredPassword, check_password_complexity},
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub password: ClearTextPassword,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> RegisterUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Checks run in order email, username, password; the first failure is returned.
    pub async fn execute(&self, input: RegisterInput) -> AuthResult<IssuedSession> {
        Email::parse(&input.email)?;
        UserName::parse(&input.username)?;
        check_password_complexity(input.password.as_str())?;

        let email = sanitize(&input.email);
        let username = sanitize(&input.username);

        // Argon2id is CPU-bound
        let hasher = PasswordHasher::new(self.config.password_cost);
        let password = input.password;
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))??;

        let user = self
            .repo
            .insert_user(&NewUser {
                email,
                username,
                password: StoredPassword::Hashed(hashed),
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        SessionService::new(self.repo.clone(), self.config.clone())
            .create(user.id)
            .await
    }
}
