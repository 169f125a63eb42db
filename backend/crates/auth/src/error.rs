//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{
    app_error::{AppError, INTERNAL_ERROR_MESSAGE},
    kind::ErrorKind,
};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
///
/// The `Display` text of client errors is the message returned to the user.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email format")]
    InvalidEmail,

    #[error(
        "Username must be between 3 and 20 characters and contain only letters, numbers, and underscores"
    )]
    InvalidUsername,

    #[error(
        "Password must be at least 8 characters long and include uppercase, lowercase, numbers, and special characters"
    )]
    WeakPassword,

    /// Malformed JSON or missing fields
    #[error("Invalid input")]
    InvalidInput,

    /// Provider callback without `code`
    #[error("Missing authorization code")]
    MissingAuthorizationCode,

    /// Email or username already registered
    #[error("email or username already taken")]
    UserTaken,

    /// Unknown username, or a federated-only account
    #[error("invalid username")]
    UnknownUser,

    #[error("invalid password")]
    WrongPassword,

    /// Session cookie missing, unknown or expired
    #[error("Not logged in")]
    SessionInvalid,

    /// Logout without a session cookie
    #[error("No active session")]
    NoActiveSession,

    #[error("Invalid CSRF token")]
    CsrfInvalid,

    /// Identity provider is not configured
    #[error("Unknown identity provider")]
    ProviderDisabled,

    /// Identity provider unreachable or answered something unusable
    #[error("Identity provider error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidEmail
            | AuthError::InvalidUsername
            | AuthError::WeakPassword
            | AuthError::InvalidInput
            | AuthError::MissingAuthorizationCode
            | AuthError::UserTaken => ErrorKind::BadRequest,
            AuthError::UnknownUser
            | AuthError::WrongPassword
            | AuthError::SessionInvalid
            | AuthError::NoActiveSession => ErrorKind::Unauthorized,
            AuthError::CsrfInvalid => ErrorKind::Forbidden,
            AuthError::ProviderDisabled => ErrorKind::NotFound,
            AuthError::Upstream(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError. Server-side details never leave the process.
    pub fn to_app_error(&self) -> AppError {
        if self.kind().is_server_error() {
            AppError::new(self.kind(), INTERNAL_ERROR_MESSAGE)
        } else {
            AppError::new(self.kind(), self.to_string())
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Upstream(msg) => {
                tracing::error!(message = %msg, "Identity provider failure");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::UnknownUser | AuthError::WrongPassword => {
                tracing::warn!(reason = %self, "Failed login attempt");
            }
            AuthError::CsrfInvalid => {
                tracing::warn!("CSRF verification failed");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        // without_url: provider URLs may carry the authorization code
        AuthError::Upstream(err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_400() {
        for err in [
            AuthError::InvalidEmail,
            AuthError::InvalidUsername,
            AuthError::WeakPassword,
            AuthError::InvalidInput,
            AuthError::UserTaken,
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_credential_errors_are_401() {
        assert_eq!(AuthError::UnknownUser.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::WrongPassword.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::UnknownUser.to_string(), "invalid username");
        assert_eq!(AuthError::WrongPassword.to_string(), "invalid password");
    }

    #[test]
    fn test_csrf_error_is_403() {
        let err = AuthError::CsrfInvalid.to_app_error();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "Invalid CSRF token");
    }

    #[test]
    fn test_upstream_details_hidden() {
        let err = AuthError::Upstream("client_secret=hunter2 rejected".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_app_error().message(), INTERNAL_ERROR_MESSAGE);
    }
}
