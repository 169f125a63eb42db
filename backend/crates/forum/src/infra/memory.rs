//! In-memory forum repository

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use kernel::id::{PostId, UserId};

use crate::domain::post::{NewPost, Post};
use crate::domain::repository::{PostRepository, VoteRepository};
use crate::domain::vote::{Vote, VoteTally};
use crate::error::{ForumError, ForumResult};

#[derive(Default)]
struct MemoryState {
    last_post_id: i64,
    posts: BTreeMap<i64, Post>,
    /// (post_id, user_id) → vote
    votes: HashMap<(i64, i64), Vote>,
}

#[derive(Clone, Default)]
pub struct MemoryForumRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryForumRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PostRepository for MemoryForumRepository {
    async fn create_post(&self, post: &NewPost) -> ForumResult<Post> {
        let post = post.sanitized();
        let mut state = self.write();
        state.last_post_id += 1;

        let created = Post {
            id: PostId::new(state.last_post_id),
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            image_path: post.image_path,
            likes: 0,
            dislikes: 0,
            created_at: Utc::now(),
        };
        state.posts.insert(created.id.get(), created.clone());

        Ok(created)
    }

    async fn find_post(&self, post_id: PostId) -> ForumResult<Option<Post>> {
        Ok(self.read().posts.get(&post_id.get()).cloned())
    }

    async fn list_posts(&self) -> ForumResult<Vec<Post>> {
        Ok(self.read().posts.values().rev().cloned().collect())
    }
}

impl VoteRepository for MemoryForumRepository {
    async fn find_vote(&self, post_id: PostId, user_id: UserId) -> ForumResult<Option<Vote>> {
        Ok(self
            .read()
            .votes
            .get(&(post_id.get(), user_id.get()))
            .copied())
    }

    async fn set_vote(&self, post_id: PostId, user_id: UserId, vote: Vote) -> ForumResult<()> {
        let mut state = self.write();
        if !state.posts.contains_key(&post_id.get()) {
            return Err(ForumError::PostNotFound);
        }
        state.votes.insert((post_id.get(), user_id.get()), vote);
        Ok(())
    }

    async fn clear_vote(&self, post_id: PostId, user_id: UserId) -> ForumResult<()> {
        self.write().votes.remove(&(post_id.get(), user_id.get()));
        Ok(())
    }

    async fn refresh_vote_counts(&self, post_id: PostId) -> ForumResult<VoteTally> {
        let mut state = self.write();

        let mut tally = VoteTally::default();
        for ((voted_post, _), vote) in &state.votes {
            if *voted_post != post_id.get() {
                continue;
            }
            match vote {
                Vote::Like => tally.likes += 1,
                Vote::Dislike => tally.dislikes += 1,
            }
        }

        let post = state
            .posts
            .get_mut(&post_id.get())
            .ok_or(ForumError::PostNotFound)?;
        post.likes = tally.likes;
        post.dislikes = tally.dislikes;

        Ok(tally)
    }
}
