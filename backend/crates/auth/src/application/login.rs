//! Login Use Case
//!
//! Checks a username and password and opens a session.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::session::{IssuedSession, SessionService};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub username: String,
    pub password: ClearTextPassword,
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<IssuedSession> {
        let user = self
            .repo
            .find_user_by_username(&input.username)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        // Federated accounts have no usable password
        if user.password.is_federated() {
            return Err(AuthError::UnknownUser);
        }

        let stored = user.password.clone();
        let password = input.password;
        let valid = tokio::task::spawn_blocking(move || stored.verify(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))?;

        if !valid {
            return Err(AuthError::WrongPassword);
        }

        tracing::info!(user_id = %user.id, "User logged in");

        SessionService::new(self.repo.clone(), self.config.clone())
            .create(user.id)
            .await
    }
}
