//! Content-Security-Policy header

use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

/// Scripts, styles and fonts from self plus the cdnjs allowlist; images may
/// also come from `data:` and `blob:` URLs.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
script-src 'self' https://cdnjs.cloudflare.com 'unsafe-inline' 'unsafe-eval'; \
style-src 'self' https://cdnjs.cloudflare.com 'unsafe-inline'; \
font-src 'self' data: https://cdnjs.cloudflare.com/ajax/libs/font-awesome/; \
img-src 'self' data: blob:";

pub async fn set_csp_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    response.headers_mut().insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_policy_set_on_every_response() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(set_csp_headers));

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let policy = response.headers()[header::CONTENT_SECURITY_POLICY]
            .to_str()
            .unwrap();
        assert!(policy.starts_with("default-src 'self';"));
        assert!(policy.contains("img-src 'self' data: blob:"));
        assert!(policy.contains("https://cdnjs.cloudflare.com"));
    }
}
