//! Entity Module

pub mod csrf_token;
pub mod oauth_profile;
pub mod session;
pub mod user;
