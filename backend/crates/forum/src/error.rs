//! Forum Error Types

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{
    app_error::{AppError, INTERNAL_ERROR_MESSAGE},
    kind::ErrorKind,
};
use thiserror::Error;

pub type ForumResult<T> = Result<T, ForumError>;

/// The `Display` text of client errors is the message returned to the user.
#[derive(Debug, Error)]
pub enum ForumError {
    #[error("Post ID and vote are required")]
    MissingVoteFields,

    #[error("Invalid post ID format")]
    InvalidPostId,

    #[error("Vote must be either 'like' or 'dislike'")]
    InvalidVote,

    #[error("Post not found")]
    PostNotFound,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ForumError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ForumError::MissingVoteFields | ForumError::InvalidPostId | ForumError::InvalidVote => {
                ErrorKind::BadRequest
            }
            ForumError::PostNotFound => ErrorKind::NotFound,
            ForumError::Auth(e) => e.kind(),
            ForumError::Database(_) | ForumError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            ForumError::Auth(e) => e.to_app_error(),
            _ if self.kind().is_server_error() => AppError::new(self.kind(), INTERNAL_ERROR_MESSAGE),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    pub fn log(&self) {
        match self {
            ForumError::Auth(e) => e.log(),
            ForumError::Database(e) => tracing::error!(error = %e, "Forum database error"),
            ForumError::Internal(msg) => tracing::error!(message = %msg, "Forum internal error"),
            _ => tracing::debug!(error = %self, "Forum request rejected"),
        }
    }
}

impl IntoResponse for ForumError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ForumError::InvalidVote.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ForumError::PostNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ForumError::Auth(AuthError::CsrfInvalid).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = ForumError::Internal("relation \"likes\" does not exist".to_string());
        assert_eq!(err.to_app_error().message(), INTERNAL_ERROR_MESSAGE);
    }
}
