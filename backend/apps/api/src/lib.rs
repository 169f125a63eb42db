//! API Server
//!
//! Wires the auth and forum crates into one HTTP server:
//! - `config` - environment-driven [`ServerConfig`]
//! - `app` - router composition and limiter classes
//! - `server` - storage selection, background workers, serve loop
//! - `shutdown` - SIGINT/SIGTERM handling

pub mod app;
pub mod config;
pub mod server;
pub mod shutdown;

pub use app::{AppServices, RateLimiters, build_router};
pub use config::ServerConfig;
pub use server::run;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
