//! OAuth 2.0 clients for Google and GitHub

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::application::config::{OAuthConfig, ProviderConfig};
use crate::domain::entity::oauth_profile::OAuthProfile;
use crate::domain::identity_provider::{
    AccessToken, IdentityProvider, ProviderKind, ProviderRegistry,
};
use crate::error::{AuthError, AuthResult};

/// GitHub rejects API requests without a User-Agent
const USER_AGENT: &str = concat!("forum-auth/", env!("CARGO_PKG_VERSION"));

/// Authorization code flow against a provider's HTTP endpoints
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    kind: ProviderKind,
    config: Arc<ProviderConfig>,
    http: reqwest::Client,
}

impl HttpIdentityProvider {
    pub fn new(kind: ProviderKind, config: ProviderConfig, timeout: Duration) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            kind,
            config: Arc::new(config),
            http,
        })
    }

    async fn get_json<T>(&self, url: &str, token: &AccessToken) -> AuthResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self
            .http
            .get(url)
            .bearer_auth(token.0.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?;
        Ok(value)
    }
}

/// Build one client per configured provider
pub fn registry_from_config(config: &OAuthConfig) -> AuthResult<ProviderRegistry<HttpIdentityProvider>> {
    let mut registry = ProviderRegistry::new();
    for kind in ProviderKind::ALL {
        if let Some(provider) = config.provider(kind) {
            registry = registry.with(
                kind,
                HttpIdentityProvider::new(kind, provider.clone(), config.request_timeout)?,
            );
            tracing::info!(provider = %kind, "Identity provider enabled");
        }
    }
    Ok(registry)
}

impl IdentityProvider for HttpIdentityProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn authorize_url(&self) -> AuthResult<String> {
        authorize_url(self.kind, &self.config)
    }

    async fn exchange_code(&self, code: &str) -> AuthResult<AccessToken> {
        let redirect_uri = self.config.redirect_uri.as_str();
        let mut form = vec![
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];
        if self.kind == ProviderKind::Google {
            form.push(("grant_type", "authorization_code"));
        }

        let response = self
            .http
            .post(&self.config.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json::<TokenResponse>()
            .await?;

        parse_token_response(response)
    }

    async fn fetch_profile(&self, token: &AccessToken) -> AuthResult<OAuthProfile> {
        match self.kind {
            ProviderKind::Google => {
                let user: GoogleUser = self.get_json(&self.config.userinfo_url, token).await?;
                google_profile(user)
            }
            ProviderKind::Github => {
                let user: GithubUser = self.get_json(&self.config.userinfo_url, token).await?;

                let email = match user.email.as_deref().filter(|email| !email.is_empty()) {
                    Some(email) => email.to_string(),
                    None => {
                        let url = self.config.emails_url.as_deref().ok_or_else(|| {
                            AuthError::Upstream("profile has no email".to_string())
                        })?;
                        let emails: Vec<GithubEmail> = self.get_json(url, token).await?;
                        select_primary_email(&emails)
                            .ok_or_else(|| AuthError::Upstream("no email on account".to_string()))?
                            .to_string()
                    }
                };

                Ok(OAuthProfile {
                    provider_user_id: user.id.to_string(),
                    display_name: user.login,
                    email,
                })
            }
        }
    }
}

// ============================================================================
// Wire formats
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    /// GitHub answers 200 with an `error` field on a bad code
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: i64,
    login: String,
    email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubEmail {
    pub email: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub verified: bool,
}

fn authorize_url(kind: ProviderKind, config: &ProviderConfig) -> AuthResult<String> {
    let mut params = vec![
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];
    match kind {
        ProviderKind::Google => params.extend([
            ("response_type", "code"),
            ("scope", "email profile"),
            ("access_type", "offline"),
        ]),
        ProviderKind::Github => params.push(("scope", "user:email")),
    }

    let url = Url::parse_with_params(&config.authorize_url, &params)
        .map_err(|e| AuthError::Internal(format!("invalid authorize URL: {e}")))?;
    Ok(url.into())
}

fn parse_token_response(response: TokenResponse) -> AuthResult<AccessToken> {
    if let Some(error) = response.error {
        return Err(AuthError::Upstream(format!("token endpoint error: {error}")));
    }
    response
        .access_token
        .filter(|token| !token.is_empty())
        .map(|token| AccessToken(SecretString::from(token)))
        .ok_or_else(|| AuthError::Upstream("token response without access_token".to_string()))
}

fn google_profile(user: GoogleUser) -> AuthResult<OAuthProfile> {
    let email = user
        .email
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AuthError::Upstream("profile has no email".to_string()))?;

    let display_name = user
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    Ok(OAuthProfile {
        provider_user_id: user.id,
        display_name,
        email,
    })
}

/// Primary and verified first, then the first listed.
pub fn select_primary_email(emails: &[GithubEmail]) -> Option<&str> {
    emails
        .iter()
        .find(|email| email.primary && email.verified)
        .or_else(|| emails.first())
        .map(|email| email.email.as_str())
}
