//! PostgreSQL forum repository

use chrono::{DateTime, Utc};
use kernel::id::{PostId, UserId};
use sqlx::PgPool;

use crate::domain::post::{NewPost, Post};
use crate::domain::repository::{PostRepository, VoteRepository};
use crate::domain::vote::{Vote, VoteTally};
use crate::error::{ForumError, ForumResult};

#[derive(Clone)]
pub struct PgForumRepository {
    pool: PgPool,
}

impl PgForumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PostRepository for PgForumRepository {
    async fn create_post(&self, post: &NewPost) -> ForumResult<Post> {
        let post = post.sanitized();
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (user_id, title, content, image_path)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, content, image_path, likes, dislikes, created_at
            "#,
        )
        .bind(post.user_id.get())
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image_path)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_post())
    }

    async fn find_post(&self, post_id: PostId) -> ForumResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, title, content, image_path, likes, dislikes, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PostRow::into_post))
    }

    async fn list_posts(&self) -> ForumResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, title, content, image_path, likes, dislikes, created_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostRow::into_post).collect())
    }
}

impl VoteRepository for PgForumRepository {
    async fn find_vote(&self, post_id: PostId, user_id: UserId) -> ForumResult<Option<Vote>> {
        let vote: Option<String> =
            sqlx::query_scalar("SELECT user_vote FROM likes WHERE post_id = $1 AND user_id = $2")
                .bind(post_id.get())
                .bind(user_id.get())
                .fetch_optional(&self.pool)
                .await?;

        vote.map(|v| {
            v.parse::<Vote>()
                .map_err(|_| ForumError::Internal(format!("unexpected vote value {v:?}")))
        })
        .transpose()
    }

    async fn set_vote(&self, post_id: PostId, user_id: UserId, vote: Vote) -> ForumResult<()> {
        sqlx::query(
            r#"
            INSERT INTO likes (post_id, user_id, user_vote)
            VALUES ($1, $2, $3)
            ON CONFLICT (post_id, user_id) DO UPDATE SET user_vote = EXCLUDED.user_vote
            "#,
        )
        .bind(post_id.get())
        .bind(user_id.get())
        .bind(vote.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear_vote(&self, post_id: PostId, user_id: UserId) -> ForumResult<()> {
        sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id.get())
            .bind(user_id.get())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn refresh_vote_counts(&self, post_id: PostId) -> ForumResult<VoteTally> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            UPDATE posts SET
                likes = (SELECT COUNT(*) FROM likes WHERE post_id = $1 AND user_vote = 'like'),
                dislikes = (SELECT COUNT(*) FROM likes WHERE post_id = $1 AND user_vote = 'dislike')
            WHERE id = $1
            RETURNING likes, dislikes
            "#,
        )
        .bind(post_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let (likes, dislikes) = row.ok_or(ForumError::PostNotFound)?;
        Ok(VoteTally { likes, dislikes })
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    user_id: i64,
    title: String,
    content: String,
    image_path: Option<String>,
    likes: i64,
    dislikes: i64,
    created_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            id: PostId::new(self.id),
            user_id: UserId::new(self.user_id),
            title: self.title,
            content: self.content,
            image_path: self.image_path,
            likes: self.likes,
            dislikes: self.dislikes,
            created_at: self.created_at,
        }
    }
}
