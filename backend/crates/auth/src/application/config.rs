//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::HashCost;
use secrecy::SecretString;

use crate::domain::identity_provider::ProviderKind;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session lifetime (24 hours)
    pub session_ttl: Duration,
    /// CSRF token lifetime (1 hour), capped by the session's expiry
    pub csrf_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Drop a user's other sessions when a new one is created
    pub single_session_per_user: bool,
    /// Argon2id work factor for new hashes
    pub password_cost: HashCost,
    /// Cadence of the expired-session and expired-CSRF sweepers
    pub sweep_interval: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "session_token".to_string(),
            session_ttl: Duration::from_secs(24 * 3600),
            csrf_ttl: Duration::from_secs(3600),
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
            single_session_per_user: true,
            password_cost: HashCost::default(),
            sweep_interval: Duration::from_secs(3600),
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// Attributes of the session cookie
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: i64::try_from(self.session_ttl.as_secs()).ok(),
        }
    }
}

/// Client registration with one identity provider.
///
/// `client_secret` is never logged; `Debug` redacts it.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    /// Must match the URI registered with the provider
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    /// Secondary email listing, queried when the profile carries no email
    pub emails_url: Option<String>,
}

impl ProviderConfig {
    pub fn google(
        client_id: impl Into<String>,
        client_secret: SecretString,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
            authorize_url: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            emails_url: None,
        }
    }

    pub fn github(
        client_id: impl Into<String>,
        client_secret: SecretString,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
            authorize_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            userinfo_url: "https://api.github.com/user".to_string(),
            emails_url: Some("https://api.github.com/user/emails".to_string()),
        }
    }

    /// Point every endpoint at `base` (a local stub server in tests)
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.authorize_url = format!("{base}/authorize");
        self.token_url = format!("{base}/token");
        self.userinfo_url = format!("{base}/userinfo");
        if self.emails_url.is_some() {
            self.emails_url = Some(format!("{base}/emails"));
        }
        self
    }
}

/// Identity providers enabled for this deployment. An absent entry disables the provider.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub google: Option<ProviderConfig>,
    pub github: Option<ProviderConfig>,
    /// Per-request timeout for calls to the provider
    pub request_timeout: Duration,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            google: None,
            github: None,
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl OAuthConfig {
    pub fn provider(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        match kind {
            ProviderKind::Google => self.google.as_ref(),
            ProviderKind::Github => self.github.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = AuthConfig::default().session_cookie().build_set_cookie("abc");
        assert_eq!(
            cookie,
            "session_token=abc; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=86400"
        );
    }

    #[test]
    fn test_development_cookie_not_secure() {
        let cookie = AuthConfig::development().session_cookie().build_set_cookie("abc");
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_client_secret_not_in_debug() {
        let config = ProviderConfig::github(
            "client-id",
            SecretString::from("very-secret".to_string()),
            "http://localhost:8080/auth/github/callback",
        );
        let debug = format!("{config:?}");
        assert!(debug.contains("client-id"));
        assert!(!debug.contains("very-secret"));
    }

    #[test]
    fn test_with_base_url() {
        let config = ProviderConfig::google("id", SecretString::from("s".to_string()), "cb")
            .with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.token_url, "http://127.0.0.1:9000/token");
        assert!(config.emails_url.is_none());
    }
}
