//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod identity_provider;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    csrf_token::CsrfToken,
    oauth_profile::OAuthProfile,
    session::Session,
    user::{NewUser, User},
};
pub use identity_provider::{AccessToken, IdentityProvider, ProviderKind, ProviderRegistry};
pub use repository::{CsrfRepository, SessionRepository, UserRepository};
