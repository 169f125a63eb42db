//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Random token generation and constant-time comparison
//! - Password hashing (Argon2id)
//! - Cookie management
//! - Rate limiting infrastructure
//! - Common middleware components (CSP, CORS, path/method, error pages, timeouts)

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod middleware;
pub mod password;
pub mod rate_limit;
