//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod memory;
pub mod oauth;
pub mod postgres;

pub use memory::MemoryAuthRepository;
pub use oauth::HttpIdentityProvider;
pub use postgres::PgAuthRepository;
