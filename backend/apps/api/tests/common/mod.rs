#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api::config::ServerConfig;
use api::{AppServices, RateLimiters, build_router};
use auth::domain::{AccessToken, IdentityProvider, OAuthProfile, ProviderKind, ProviderRegistry};
use auth::{AuthError, AuthResult, MemoryAuthRepository};
use axum::Router;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Method, Request, Response, header};
use forum::MemoryForumRepository;
use http_body_util::BodyExt;
use platform::password::HashCost;
use secrecy::SecretString;
use tower::ServiceExt;

pub const PASSWORD: &str = "Passw0rd!";

/// Defaults with the cheapest Argon2 parameters
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.auth.password_cost = HashCost::minimal();
    config
}

/// Identity provider answering from memory
pub struct StubProvider {
    pub kind: ProviderKind,
    pub profile: OAuthProfile,
    /// Stall the code exchange this long
    pub delay: Option<Duration>,
}

impl StubProvider {
    pub fn new(kind: ProviderKind, email: &str, display_name: &str) -> Self {
        Self {
            kind,
            profile: OAuthProfile {
                provider_user_id: "10001".to_string(),
                display_name: display_name.to_string(),
                email: email.to_string(),
            },
            delay: None,
        }
    }
}

impl IdentityProvider for StubProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn authorize_url(&self) -> AuthResult<String> {
        Ok(format!(
            "https://idp.test/{}/authorize?client_id=stub-client",
            self.kind
        ))
    }

    async fn exchange_code(&self, code: &str) -> AuthResult<AccessToken> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if code == "rejected" {
            return Err(AuthError::Upstream("bad_verification_code".to_string()));
        }
        Ok(AccessToken(SecretString::from("stub-access-token")))
    }

    async fn fetch_profile(&self, _token: &AccessToken) -> AuthResult<OAuthProfile> {
        Ok(self.profile.clone())
    }
}

pub struct TestApp {
    pub router: Router,
    pub auth_repo: Arc<MemoryAuthRepository>,
    pub forum_repo: Arc<MemoryForumRepository>,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Register `username` and return its `Cookie` header value
    pub async fn register(&self, username: &str, email: &str) -> String {
        let response = self
            .send(json_request(
                Method::POST,
                "/register",
                serde_json::json!({
                    "email": email,
                    "username": username,
                    "password": PASSWORD,
                }),
                None,
            ))
            .await;
        assert_eq!(response.status(), 302, "registration of {username} failed");
        session_cookie(&response).expect("registration sets the session cookie")
    }

    /// Load the home page as `cookie` and pull the CSRF token out of it
    pub async fn csrf_token(&self, cookie: &str) -> String {
        let response = self.send(page_request(Method::GET, "/", Some(cookie))).await;
        assert_eq!(response.status(), 200);
        csrf_from_html(&body_string(response).await).expect("home page embeds a CSRF token")
    }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config(), ProviderRegistry::new())
}

pub fn build_test_app_with(config: ServerConfig, providers: ProviderRegistry<StubProvider>) -> TestApp {
    let auth_repo = Arc::new(MemoryAuthRepository::new());
    let forum_repo = Arc::new(MemoryForumRepository::new());

    let router = build_router(
        &config,
        AppServices {
            auth_repo: auth_repo.clone(),
            forum_repo: forum_repo.clone(),
            providers,
            limiters: RateLimiters::new(&config.rate_limits),
        },
    )
    .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40922))));

    TestApp {
        router,
        auth_repo,
        forum_repo,
    }
}

pub fn json_request(
    method: Method,
    uri: &str,
    body: serde_json::Value,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// A browser navigation
pub fn page_request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT, "text/html");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Same-origin fetch expecting JSON back
pub fn api_request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `name=value` of the first Set-Cookie, usable as a `Cookie` header
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}

pub fn set_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Token embedded in the home page's `<meta name="csrf-token">`
pub fn csrf_from_html(html: &str) -> Option<String> {
    let marker = r#"<meta name="csrf-token" content=""#;
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    Some(html[start..end].to_string())
}
