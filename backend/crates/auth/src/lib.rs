//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and identity provider traits
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL and in-memory repositories, HTTP identity providers
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Registration and login with email, username and password
//! - Federated login through Google and GitHub (authorization code flow)
//! - Server-side sessions referenced by an HttpOnly cookie
//! - One CSRF token per session, checked on state-changing requests
//! - Background sweepers for expired sessions and CSRF tokens
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, verified in constant time
//! - Session and CSRF tokens drawn from the OS CSPRNG
//! - Stored free-form strings are HTML-escaped
//! - Server-side failures never leak details to clients

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{AuthConfig, OAuthConfig, ProviderConfig};
pub use error::{AuthError, AuthResult};
pub use infra::{HttpIdentityProvider, MemoryAuthRepository, PgAuthRepository};
pub use presentation::router::{AuthRouteChains, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
