//! Integration tests for the home page and the CSRF-protected vote endpoint.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use common::{TestApp, body_json, body_string, build_test_app, csrf_from_html, page_request};
use forum::domain::{NewPost, PostRepository};
use kernel::id::{PostId, UserId};
use serde_json::json;

async fn seed_post(app: &TestApp) -> PostId {
    app.forum_repo
        .create_post(&NewPost {
            user_id: UserId::new(1),
            title: "First post".to_string(),
            content: "Hello forum".to_string(),
            image_path: None,
        })
        .await
        .unwrap()
        .id
}

fn vote_request(cookie: Option<&str>, csrf_header: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::post("/likePost")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::ACCEPT, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    if let Some(token) = csrf_header {
        builder = builder.header("X-CSRF-Token", token);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

// ---------------------------------------------------------------------------
// Test: home page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn home_page_embeds_token_only_when_signed_in() {
    let app = build_test_app();
    seed_post(&app).await;

    let response = app.send(page_request(Method::GET, "/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(csrf_from_html(&html).is_none());
    assert!(html.contains("First post"));

    let cookie = app.register("henry", "henry@example.com").await;
    let response = app.send(page_request(Method::GET, "/", Some(&cookie))).await;
    let html = body_string(response).await;
    let token = csrf_from_html(&html).unwrap();
    // 32 random bytes, base64url without padding
    assert_eq!(token.len(), 43);
    assert!(html.contains(&format!(r#"<input type="hidden" name="csrf_token" value="{token}">"#)));
}

#[tokio::test]
async fn home_page_renders_post_markup_escaped() {
    let app = build_test_app();
    app.forum_repo
        .create_post(&NewPost {
            user_id: UserId::new(1),
            title: "<script>alert(1)</script>".to_string(),
            content: "<img src=x onerror=alert(2)>".to_string(),
            image_path: None,
        })
        .await
        .unwrap();

    let html = body_string(app.send(page_request(Method::GET, "/", None)).await).await;

    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(!html.contains("<img src=x"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(html.contains("&lt;img src=x onerror=alert(2)&gt;"));
}

// ---------------------------------------------------------------------------
// Test: /likePost gates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn vote_without_session_redirects_to_login() {
    let app = build_test_app();
    let post = seed_post(&app).await;

    let response = app
        .send(vote_request(None, None, &format!("post_id={post}&vote=like")))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login_Page");
}

#[tokio::test]
async fn vote_without_csrf_token_is_forbidden() {
    let app = build_test_app();
    let post = seed_post(&app).await;
    let cookie = app.register("irene", "irene@example.com").await;
    app.csrf_token(&cookie).await;

    let response = app
        .send(vote_request(Some(&cookie), None, &format!("post_id={post}&vote=like")))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await, json!({"error": "Invalid CSRF token"}));
}

#[tokio::test]
async fn vote_with_header_token_toggles() {
    let app = build_test_app();
    let post = seed_post(&app).await;
    let cookie = app.register("jack", "jack@example.com").await;
    let token = app.csrf_token(&cookie).await;
    let form = format!("post_id={post}&vote=like");

    let response = app.send(vote_request(Some(&cookie), Some(&token), &form)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"likes": 1, "dislikes": 0, "vote": "like"})
    );

    // the same vote again withdraws it
    let response = app.send(vote_request(Some(&cookie), Some(&token), &form)).await;
    assert_eq!(
        body_json(response).await,
        json!({"likes": 0, "dislikes": 0, "vote": null})
    );

    let form = format!("post_id={post}&vote=dislike");
    let response = app.send(vote_request(Some(&cookie), Some(&token), &form)).await;
    assert_eq!(
        body_json(response).await,
        json!({"likes": 0, "dislikes": 1, "vote": "dislike"})
    );
}

#[tokio::test]
async fn vote_with_form_field_token() {
    let app = build_test_app();
    let post = seed_post(&app).await;
    let cookie = app.register("kate", "kate@example.com").await;
    let token = app.csrf_token(&cookie).await;

    let response = app
        .send(vote_request(
            Some(&cookie),
            None,
            &format!("csrf_token={token}&post_id={post}&vote=dislike"),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["dislikes"], 1);
}

#[tokio::test]
async fn wrong_token_revokes_the_real_one() {
    let app = build_test_app();
    let post = seed_post(&app).await;
    let cookie = app.register("liam", "liam@example.com").await;
    let token = app.csrf_token(&cookie).await;
    let form = format!("post_id={post}&vote=like");

    let response = app
        .send(vote_request(Some(&cookie), Some("forged"), &form))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send(vote_request(Some(&cookie), Some(&token), &form)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // reloading the page issues a usable token again
    let fresh = app.csrf_token(&cookie).await;
    let response = app.send(vote_request(Some(&cookie), Some(&fresh), &form)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn another_sessions_token_is_rejected() {
    let app = build_test_app();
    let post = seed_post(&app).await;
    let mia = app.register("mia", "mia@example.com").await;
    let noah = app.register("noah", "noah@example.com").await;
    let mia_token = app.csrf_token(&mia).await;
    app.csrf_token(&noah).await;

    let response = app
        .send(vote_request(
            Some(&noah),
            Some(&mia_token),
            &format!("post_id={post}&vote=like"),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Test: vote form validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn vote_form_validation() {
    let app = build_test_app();
    let post = seed_post(&app).await;
    let cookie = app.register("olivia", "olivia@example.com").await;
    let token = app.csrf_token(&cookie).await;

    let cases = [
        (format!("post_id={post}"), "Post ID and vote are required"),
        ("post_id=abc&vote=like".to_string(), "Invalid post ID format"),
        (
            format!("post_id={post}&vote=love"),
            "Vote must be either 'like' or 'dislike'",
        ),
    ];

    for (form, message) in cases {
        let response = app.send(vote_request(Some(&cookie), Some(&token), &form)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{form}");
        assert_eq!(body_json(response).await["error"], message, "{form}");
    }

    let response = app
        .send(vote_request(Some(&cookie), Some(&token), "post_id=999&vote=like"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
