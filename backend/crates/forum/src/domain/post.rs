//! Post Entity

use auth::domain::value_object::sanitize::sanitize;
use chrono::{DateTime, Utc};
use kernel::id::{PostId, UserId};

#[derive(Debug, Clone)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    /// HTML-escaped
    pub title: String,
    /// HTML-escaped
    pub content: String,
    pub image_path: Option<String>,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub image_path: Option<String>,
}

impl NewPost {
    /// Copy with `title` and `content` HTML-escaped, as repositories store them.
    pub fn sanitized(&self) -> Self {
        Self {
            user_id: self.user_id,
            title: sanitize(&self.title),
            content: sanitize(&self.content),
            image_path: self.image_path.clone(),
        }
    }
}
