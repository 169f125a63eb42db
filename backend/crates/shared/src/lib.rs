//! Shared Kernel - vocabulary shared by every forum crate
//!
//! - Common error type ([`error::app_error::AppError`]) and its HTTP mapping
//! - Typed integer ids for users and posts
//!
//! Only things whose meaning is identical across the auth and forum
//! domains belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
