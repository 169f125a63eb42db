//! User Entity

use kernel::id::UserId;

use crate::domain::value_object::user_password::StoredPassword;

/// Registered account
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    /// HTML-escaped, unique
    pub email: String,
    /// HTML-escaped, unique
    pub username: String,
    pub password: StoredPassword,
}

/// Account about to be inserted. The id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: StoredPassword,
}
