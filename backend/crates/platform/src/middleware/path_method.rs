//! Path and method validation for single-endpoint routes

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use super::error_page::{ErrorPage, ErrorPageRenderer, error_page_response};

/// The one path and method a route answers to
#[derive(Clone)]
pub struct PathMethodRule {
    pub path: &'static str,
    pub method: Method,
    pub renderer: ErrorPageRenderer,
}

/// 404 page on path mismatch, 405 page on method mismatch.
pub async fn validate_path_method(
    State(rule): State<PathMethodRule>,
    req: Request,
    next: Next,
) -> Response {
    if req.uri().path() != rule.path {
        return error_page_response(rule.renderer, &ErrorPage::NOT_FOUND);
    }
    // HEAD is answered by GET routes
    let method_ok = req.method() == rule.method
        || (rule.method == Method::GET && req.method() == Method::HEAD);
    if !method_ok {
        return error_page_response(rule.renderer, &ErrorPage::METHOD_NOT_ALLOWED);
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::any};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn render(page: &ErrorPage) -> String {
        format!("{}|{}", page.title, page.message)
    }

    fn app() -> Router {
        let rule = PathMethodRule {
            path: "/login",
            method: Method::POST,
            renderer: render,
        };
        Router::new().route(
            "/login",
            any(|| async { "in" }).layer(middleware::from_fn_with_state(
                rule,
                validate_path_method,
            )),
        )
    }

    #[tokio::test]
    async fn test_declared_method_passes() {
        let response = app()
            .oneshot(Request::post("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrong_method_is_405_page() {
        let response = app()
            .oneshot(Request::get("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(
            &bytes[..],
            b"Method Not Allowed|Oops! The Method Used is Not Allowed"
        );
    }

    #[tokio::test]
    async fn test_wrong_path_is_404_page() {
        let rule = PathMethodRule {
            path: "/",
            method: Method::GET,
            renderer: render,
        };
        // a catch-all route sees paths other than its declared one
        let app = Router::new().fallback_service(any(|| async { "home" }).layer(
            middleware::from_fn_with_state(rule, validate_path_method),
        ));

        let response = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
