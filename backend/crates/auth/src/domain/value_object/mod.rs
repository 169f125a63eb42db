//! Value Object Module

pub mod email;
pub mod sanitize;
pub mod session_token;
pub mod user_name;
pub mod user_password;
