//! User Password Value Object
//!
//! Complexity policy for new passwords, and the stored form of a user's
//! credential. Hashing itself lives in `platform::password`.

use platform::password::{ClearTextPassword, HashedPassword};

use crate::error::{AuthError, AuthResult};

pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Characters that satisfy the "special character" rule.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+{}|:\"<>?~-=[]\\;',./";

/// Stored in the password column of accounts created through an identity
/// provider. Never a valid PHC string, so it can never verify.
pub const FEDERATED_PASSWORD_SENTINEL: &str = "_";

/// At least 8 characters with one lowercase, one uppercase, one digit and
/// one character from [`SPECIAL_CHARACTERS`].
pub fn check_password_complexity(raw: &str) -> AuthResult<()> {
    let long_enough = raw.chars().count() >= PASSWORD_MIN_LENGTH;
    let has_lower = raw.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = raw.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = raw.chars().any(|c| c.is_ascii_digit());
    let has_special = raw.chars().any(|c| SPECIAL_CHARACTERS.contains(c));

    if long_enough && has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        Err(AuthError::WeakPassword)
    }
}

/// Credential as persisted in `users.password`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredPassword {
    Hashed(HashedPassword),
    /// Account created through an identity provider
    Federated,
}

impl StoredPassword {
    /// Anything that does not parse as a PHC hash is treated as federated.
    pub fn from_stored(stored: impl Into<String>) -> Self {
        HashedPassword::from_phc_string(stored)
            .map(StoredPassword::Hashed)
            .unwrap_or(StoredPassword::Federated)
    }

    pub fn as_stored(&self) -> &str {
        match self {
            StoredPassword::Hashed(hash) => hash.as_phc_string(),
            StoredPassword::Federated => FEDERATED_PASSWORD_SENTINEL,
        }
    }

    pub fn is_federated(&self) -> bool {
        matches!(self, StoredPassword::Federated)
    }

    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        match self {
            StoredPassword::Hashed(hash) => hash.verify(password),
            StoredPassword::Federated => false,
        }
    }
}
