//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod csrf;
pub mod login;
pub mod oauth_login;
pub mod register;
pub mod session;
pub mod sweeper;

// Re-exports
pub use config::{AuthConfig, OAuthConfig, ProviderConfig};
pub use csrf::CsrfService;
pub use login::{LoginInput, LoginUseCase};
pub use oauth_login::OAuthLoginUseCase;
pub use register::{RegisterInput, RegisterUseCase};
pub use session::{IssuedSession, SessionService};
pub use sweeper::{SweeperHandles, spawn_sweepers, sweep_expired};
