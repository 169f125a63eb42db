//! Error page rendering
//!
//! Rewrites downstream responses with status >= 400. API clients get a JSON
//! `{"error": ..}` body; browsers get the HTML page produced by an injected
//! [`ErrorPageRenderer`].

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

/// Data handed to the error page template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPage {
    pub code: u16,
    pub title: &'static str,
    pub message: &'static str,
}

impl ErrorPage {
    pub const NOT_FOUND: ErrorPage = ErrorPage {
        code: 404,
        title: "Page Not Found",
        message: "Oops! The page you're looking for doesn't exist.",
    };

    pub const METHOD_NOT_ALLOWED: ErrorPage = ErrorPage {
        code: 405,
        title: "Method Not Allowed",
        message: "Oops! The Method Used is Not Allowed",
    };

    pub fn for_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::NOT_FOUND,
            StatusCode::METHOD_NOT_ALLOWED => Self::METHOD_NOT_ALLOWED,
            StatusCode::INTERNAL_SERVER_ERROR => ErrorPage {
                code: 500,
                title: "Internal Server Error",
                message: "Something went wrong.",
            },
            other => ErrorPage {
                code: other.as_u16(),
                title: "Error",
                message: "An unexpected error occurred.",
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Turns an [`ErrorPage`] into an HTML document
pub type ErrorPageRenderer = fn(&ErrorPage) -> String;

/// Render `page` with its own status code.
pub fn error_page_response(renderer: ErrorPageRenderer, page: &ErrorPage) -> Response {
    (page.status(), Html(renderer(page))).into_response()
}

#[derive(Clone, Copy)]
pub struct ErrorPageState {
    pub renderer: ErrorPageRenderer,
}

/// XHR, `Accept: application/json` or a JSON request body.
pub fn is_api_request(headers: &HeaderMap) -> bool {
    let header_str = |name| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    };

    header_str(header::HeaderName::from_static("x-requested-with")) == "XMLHttpRequest"
        || header_str(header::ACCEPT).contains("application/json")
        || header_str(header::CONTENT_TYPE).starts_with("application/json")
}

fn has_content_type(headers: &HeaderMap, prefix: &str) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(prefix))
}

pub async fn render_error_pages(
    State(state): State<ErrorPageState>,
    req: Request,
    next: Next,
) -> Response {
    let api_request = is_api_request(req.headers());
    let response = next.run(req).await;
    let status = response.status();

    if status.as_u16() < 400 {
        return response;
    }

    if api_request {
        if has_content_type(response.headers(), "application/json") {
            return response;
        }
        let reason = status.canonical_reason().unwrap_or("Error");
        let (mut parts, _) = response.into_parts();
        parts.headers.remove(header::CONTENT_TYPE);
        parts.headers.remove(header::CONTENT_LENGTH);
        return (parts, Json(serde_json::json!({ "error": reason }))).into_response();
    }

    // already rendered further down (path/method validator)
    if has_content_type(response.headers(), "text/html") {
        return response;
    }

    let page = ErrorPage::for_status(status);
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);
    (parts, Html((state.renderer)(&page))).into_response()
}
