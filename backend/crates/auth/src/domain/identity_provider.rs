//! External identity providers (OAuth 2.0 authorization code flow)

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use secrecy::SecretString;

use crate::domain::entity::oauth_profile::OAuthProfile;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Google,
    Github,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Google, ProviderKind::Github];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::Github => "github",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(ProviderKind::Google),
            "github" => Ok(ProviderKind::Github),
            _ => Err(AuthError::ProviderDisabled),
        }
    }
}

/// Provider access token. Only used for the profile request.
#[derive(Debug, Clone)]
pub struct AccessToken(pub SecretString);

#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    fn kind(&self) -> ProviderKind;

    /// Consent page URL the browser is redirected to
    fn authorize_url(&self) -> AuthResult<String>;

    /// Exchange an authorization code for an access token
    async fn exchange_code(&self, code: &str) -> AuthResult<AccessToken>;

    async fn fetch_profile(&self, token: &AccessToken) -> AuthResult<OAuthProfile>;
}

/// Providers enabled for this deployment
pub struct ProviderRegistry<P> {
    google: Option<Arc<P>>,
    github: Option<Arc<P>>,
}

impl<P> ProviderRegistry<P> {
    pub fn new() -> Self {
        Self {
            google: None,
            github: None,
        }
    }

    pub fn with(mut self, kind: ProviderKind, provider: P) -> Self {
        let slot = match kind {
            ProviderKind::Google => &mut self.google,
            ProviderKind::Github => &mut self.github,
        };
        *slot = Some(Arc::new(provider));
        self
    }

    /// `None` when the provider is not configured
    pub fn get(&self, kind: ProviderKind) -> Option<Arc<P>> {
        match kind {
            ProviderKind::Google => self.google.clone(),
            ProviderKind::Github => self.github.clone(),
        }
    }

    pub fn is_enabled(&self, kind: ProviderKind) -> bool {
        self.get(kind).is_some()
    }
}

impl<P> Default for ProviderRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for ProviderRegistry<P> {
    fn clone(&self) -> Self {
        Self {
            google: self.google.clone(),
            github: self.github.clone(),
        }
    }
}
