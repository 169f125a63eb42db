//! OAuth Login Use Case
//!
//! Completes the authorization code flow: code, token, profile, local account, session.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::application::session::{IssuedSession, SessionService};
use crate::domain::entity::{oauth_profile::OAuthProfile, user::NewUser};
use crate::domain::identity_provider::IdentityProvider;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{sanitize::sanitize, user_password::StoredPassword};
use crate::error::{AuthError, AuthResult};

pub struct OAuthLoginUseCase<R, P>
where
    R: UserRepository + SessionRepository,
    P: IdentityProvider,
{
    repo: Arc<R>,
    provider: Arc<P>,
    config: Arc<AuthConfig>,
}

impl<R, P> OAuthLoginUseCase<R, P>
where
    R: UserRepository + SessionRepository,
    P: IdentityProvider + Sync,
{
    pub fn new(repo: Arc<R>, provider: Arc<P>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            provider,
            config,
        }
    }

    pub async fn execute(&self, code: Option<&str>) -> AuthResult<IssuedSession> {
        let code = code
            .filter(|code| !code.is_empty())
            .ok_or(AuthError::MissingAuthorizationCode)?;

        let access_token = self.provider.exchange_code(code).await?;
        let profile = self.provider.fetch_profile(&access_token).await?;

        let user_id = self.find_or_create_user(&profile).await?;

        tracing::info!(
            user_id = %user_id,
            provider = %self.provider.kind(),
            "Federated login"
        );

        SessionService::new(self.repo.clone(), self.config.clone())
            .create(user_id)
            .await
    }

    /// Accounts are matched by email.
    ///
    /// A new account takes the provider's display name; when that name is taken,
    /// `{name}_{provider_user_id}` is used instead.
    async fn find_or_create_user(&self, profile: &OAuthProfile) -> AuthResult<UserId> {
        let email = sanitize(&profile.email);

        if let Some(user) = self.repo.find_user_by_email(&email).await? {
            return Ok(user.id);
        }

        let username = sanitize(&profile.display_name);
        match self.insert_federated(&email, &username).await {
            Err(AuthError::UserTaken) => {}
            other => return other,
        }

        // Either the email appeared concurrently or only the name collides
        if let Some(user) = self.repo.find_user_by_email(&email).await? {
            return Ok(user.id);
        }

        let fallback = format!("{}_{}", username, sanitize(&profile.provider_user_id));
        tracing::debug!(username = %fallback, "Display name taken, using fallback");

        self.insert_federated(&email, &fallback)
            .await
            .map_err(|e| match e {
                AuthError::UserTaken => {
                    AuthError::Internal("federated username collision".to_string())
                }
                other => other,
            })
    }

    async fn insert_federated(&self, email: &str, username: &str) -> AuthResult<UserId> {
        let user = self
            .repo
            .insert_user(&NewUser {
                email: email.to_string(),
                username: username.to_string(),
                password: StoredPassword::Federated,
            })
            .await?;
        Ok(user.id)
    }
}
