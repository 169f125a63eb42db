//! Server configuration
//!
//! Everything is read from environment variables (after `.env` is loaded).
//! Unset values fall back to defaults; malformed values fail startup.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use auth::{AuthConfig, OAuthConfig, ProviderConfig};
use platform::rate_limit::RateLimitConfig;
use secrecy::SecretString;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Limiter class budgets
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    /// `/login`, `/register`
    pub auth: RateLimitConfig,
    /// `/`, `/login_Page`, `/check_login`, `/logout`
    pub page: RateLimitConfig,
    /// `/likePost`
    pub vote: RateLimitConfig,
    /// Key clients by `X-Forwarded-For` (only behind a trusted proxy)
    pub trust_forwarded: bool,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            auth: RateLimitConfig::new(5, 60),
            page: RateLimitConfig::new(30, 60),
            vote: RateLimitConfig::new(30, 60),
            trust_forwarded: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Unset selects the in-memory backend
    pub database_url: Option<SecretString>,
    pub auth: AuthConfig,
    pub oauth: OAuthConfig,
    pub rate_limits: RateLimitSettings,
    /// Deadline for every route except the OAuth ones
    pub request_timeout: Duration,
    /// Deadline for OAuth routes and for each call to a provider
    pub oauth_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            auth: AuthConfig::default(),
            oauth: OAuthConfig::default(),
            rate_limits: RateLimitSettings::default(),
            request_timeout: Duration::from_millis(1000),
            oauth_timeout: Duration::from_millis(5000),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<L>(lookup: L) -> anyhow::Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let listen_addr = parse_listen_addr(
            &env.get("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
        )?;

        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            session_ttl: Duration::from_secs(
                env.parse_or("SESSION_TTL_SECS", defaults.session_ttl.as_secs())?,
            ),
            csrf_ttl: Duration::from_secs(env.parse_or("CSRF_TTL_SECS", defaults.csrf_ttl.as_secs())?),
            sweep_interval: Duration::from_secs(
                env.parse_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval.as_secs())?,
            ),
            cookie_secure: env.flag_or("COOKIE_SECURE", defaults.cookie_secure)?,
            ..defaults
        };
        if auth.sweep_interval.is_zero() {
            return Err(anyhow!("SWEEP_INTERVAL_SECS must be greater than zero"));
        }

        let request_timeout = Duration::from_millis(env.parse_or("REQUEST_TIMEOUT_MS", 1000)?);
        let oauth_timeout = Duration::from_millis(env.parse_or("OAUTH_TIMEOUT_MS", 5000)?);

        let oauth = OAuthConfig {
            google: env
                .provider("GOOGLE", "/auth/google/callback", listen_addr)
                .map(|(id, secret, redirect)| ProviderConfig::google(id, secret, redirect)),
            github: env
                .provider("GITHUB", "/auth/github/callback", listen_addr)
                .map(|(id, secret, redirect)| ProviderConfig::github(id, secret, redirect)),
            request_timeout: oauth_timeout,
        };

        let limits = RateLimitSettings::default();
        let rate_limits = RateLimitSettings {
            auth: env.rate_limit("AUTH", &limits.auth)?,
            page: env.rate_limit("PAGE", &limits.page)?,
            vote: env.rate_limit("VOTE", &limits.vote)?,
            trust_forwarded: env.flag_or("TRUST_FORWARDED_FOR", limits.trust_forwarded)?,
        };

        Ok(Self {
            listen_addr,
            database_url: env.get("DATABASE_URL").map(SecretString::from),
            auth,
            oauth,
            rate_limits,
            request_timeout,
            oauth_timeout,
        })
    }
}

/// `:8080` binds every interface, like Go's `net.Listen`.
fn parse_listen_addr(raw: &str) -> anyhow::Result<SocketAddr> {
    let full = if raw.starts_with(':') {
        format!("0.0.0.0{raw}")
    } else {
        raw.to_string()
    };
    full.parse()
        .with_context(|| format!("LISTEN_ADDR is not a socket address: {raw}"))
}

struct Env<L>(L);

impl<L> Env<L>
where
    L: Fn(&str) -> Option<String>,
{
    /// Trimmed value; blank counts as unset
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow!("{key} has invalid value {raw:?}: {e}")),
            None => Ok(default),
        }
    }

    fn flag_or(&self, key: &str, default: bool) -> anyhow::Result<bool> {
        match self.get(key).map(|v| v.to_ascii_lowercase()).as_deref() {
            None => Ok(default),
            Some("1" | "true" | "yes" | "on") => Ok(true),
            Some("0" | "false" | "no" | "off") => Ok(false),
            Some(other) => Err(anyhow!("{key} must be a boolean, got {other:?}")),
        }
    }

    fn rate_limit(&self, class: &str, default: &RateLimitConfig) -> anyhow::Result<RateLimitConfig> {
        let requests = self.parse_or(&format!("RATE_LIMIT_{class}_REQUESTS"), default.max_requests)?;
        let interval = self.parse_or(
            &format!("RATE_LIMIT_{class}_INTERVAL_SECS"),
            default.window.as_secs(),
        )?;
        if interval == 0 {
            return Err(anyhow!("RATE_LIMIT_{class}_INTERVAL_SECS must be greater than zero"));
        }
        Ok(RateLimitConfig::new(requests, interval))
    }

    /// `(client_id, client_secret, redirect_uri)` when both credentials are set
    fn provider(
        &self,
        name: &str,
        callback_path: &str,
        listen_addr: SocketAddr,
    ) -> Option<(String, SecretString, String)> {
        let client_id = self.get(&format!("OAUTH_{name}_CLIENT_ID"))?;
        let client_secret = self.get(&format!("OAUTH_{name}_CLIENT_SECRET"))?;
        let redirect_uri = self
            .get(&format!("OAUTH_{name}_REDIRECT_URI"))
            .unwrap_or_else(|| format!("http://localhost:{}{callback_path}", listen_addr.port()));
        Some((client_id, SecretString::from(client_secret), redirect_uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert!(config.database_url.is_none());
        assert_eq!(config.auth.session_ttl, Duration::from_secs(86_400));
        assert_eq!(config.auth.csrf_ttl, Duration::from_secs(3600));
        assert!(config.auth.cookie_secure);
        assert!(config.oauth.google.is_none());
        assert!(config.oauth.github.is_none());
        assert_eq!(config.rate_limits.auth.max_requests, 5);
        assert_eq!(config.rate_limits.page.max_requests, 30);
        assert_eq!(config.rate_limits.vote.window, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_millis(1000));
        assert_eq!(config.oauth.request_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_go_style_listen_addr() {
        let config = load(&[("LISTEN_ADDR", ":9090")]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:9090".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SESSION_TTL_SECS", "600"),
            ("COOKIE_SECURE", "false"),
            ("RATE_LIMIT_AUTH_REQUESTS", "2"),
            ("RATE_LIMIT_AUTH_INTERVAL_SECS", "10"),
            ("DATABASE_URL", "postgres://forum@localhost/forum"),
        ])
        .unwrap();
        assert_eq!(config.auth.session_ttl, Duration::from_secs(600));
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.rate_limits.auth.max_requests, 2);
        assert_eq!(config.rate_limits.auth.window, Duration::from_secs(10));
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://forum@localhost/forum"
        );
    }

    #[test]
    fn test_malformed_numbers_fail() {
        let err = load(&[("SESSION_TTL_SECS", "one day")]).unwrap_err();
        assert!(err.to_string().contains("SESSION_TTL_SECS"));

        assert!(load(&[("RATE_LIMIT_VOTE_REQUESTS", "-1")]).is_err());
        assert!(load(&[("COOKIE_SECURE", "maybe")]).is_err());
        assert!(load(&[("RATE_LIMIT_PAGE_INTERVAL_SECS", "0")]).is_err());
    }

    #[test]
    fn test_provider_needs_id_and_secret() {
        let config = load(&[("OAUTH_GOOGLE_CLIENT_ID", "id-only")]).unwrap();
        assert!(config.oauth.google.is_none());

        let config = load(&[
            ("OAUTH_GITHUB_CLIENT_ID", "gh-id"),
            ("OAUTH_GITHUB_CLIENT_SECRET", "gh-secret"),
        ])
        .unwrap();
        let github = config.oauth.github.unwrap();
        assert_eq!(github.client_id, "gh-id");
        assert_eq!(github.redirect_uri, "http://localhost:8080/auth/github/callback");
        assert!(!format!("{github:?}").contains("gh-secret"));
    }
}
