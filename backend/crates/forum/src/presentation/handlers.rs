//! HTTP Handlers

use std::sync::Arc;

use auth::application::{CsrfService, SessionService};
use auth::domain::repository::{CsrfRepository, SessionRepository};
use auth::presentation::{AuthMiddlewareState, CurrentUser};
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use axum::{Extension, Form, Json};
use platform::cookie::extract_cookie;
use serde::{Deserialize, Serialize};

use crate::application::{CastVoteUseCase, parse_vote_form};
use crate::domain::repository::{PostRepository, VoteRepository};
use crate::domain::vote::Vote;
use crate::error::{ForumError, ForumResult};
use crate::presentation::pages;

/// Shared state for forum handlers
pub struct ForumAppState<F, A>
where
    F: PostRepository + VoteRepository + Send + Sync + 'static,
    A: SessionRepository + CsrfRepository + Send + Sync + 'static,
{
    pub forum: Arc<F>,
    pub auth: AuthMiddlewareState<A>,
}

impl<F, A> Clone for ForumAppState<F, A>
where
    F: PostRepository + VoteRepository + Send + Sync + 'static,
    A: SessionRepository + CsrfRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            forum: self.forum.clone(),
            auth: self.auth.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct VoteForm {
    pub post_id: Option<String>,
    pub vote: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub likes: i64,
    pub dislikes: i64,
    /// Vote now held by the caller; `null` after a withdrawal
    pub vote: Option<Vote>,
}

/// POST /likePost
pub async fn like_post<F, A>(
    State(state): State<ForumAppState<F, A>>,
    Extension(user): Extension<CurrentUser>,
    form: Result<Form<VoteForm>, FormRejection>,
) -> ForumResult<Json<VoteResponse>>
where
    F: PostRepository + VoteRepository + Send + Sync + 'static,
    A: SessionRepository + CsrfRepository + Send + Sync + 'static,
{
    let Form(form) = form.map_err(|_| ForumError::MissingVoteFields)?;
    let (post_id, vote) = parse_vote_form(form.post_id.as_deref(), form.vote.as_deref())?;

    let outcome = CastVoteUseCase::new(state.forum.clone())
        .execute(user.user_id, post_id, vote)
        .await?;

    Ok(Json(VoteResponse {
        likes: outcome.tally.likes,
        dislikes: outcome.tally.dislikes,
        vote: outcome.vote,
    }))
}

/// GET /
pub async fn home<F, A>(
    State(state): State<ForumAppState<F, A>>,
    headers: HeaderMap,
) -> ForumResult<Html<String>>
where
    F: PostRepository + VoteRepository + Send + Sync + 'static,
    A: SessionRepository + CsrfRepository + Send + Sync + 'static,
{
    let auth = &state.auth;
    let token = extract_cookie(&headers, &auth.config.session_cookie_name).unwrap_or_default();

    let session = SessionService::new(auth.repo.clone(), auth.config.clone())
        .lookup(&token)
        .await?;

    let csrf_token = match session {
        Some(session) => Some(
            CsrfService::new(auth.repo.clone(), auth.config.clone())
                .issue(session.token.as_str())
                .await?,
        ),
        None => None,
    };

    let posts = state.forum.list_posts().await?;

    Ok(Html(pages::home_page(&posts, csrf_token.as_deref())))
}
