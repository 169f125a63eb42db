//! Repository Traits

use kernel::id::{PostId, UserId};

use crate::domain::post::{NewPost, Post};
use crate::domain::vote::{Vote, VoteTally};
use crate::error::ForumResult;

#[trait_variant::make(PostRepository: Send)]
pub trait LocalPostRepository {
    async fn create_post(&self, post: &NewPost) -> ForumResult<Post>;

    async fn find_post(&self, post_id: PostId) -> ForumResult<Option<Post>>;

    /// Newest first
    async fn list_posts(&self) -> ForumResult<Vec<Post>>;
}

#[trait_variant::make(VoteRepository: Send)]
pub trait LocalVoteRepository {
    async fn find_vote(&self, post_id: PostId, user_id: UserId) -> ForumResult<Option<Vote>>;

    /// Insert or replace the user's vote on the post
    async fn set_vote(&self, post_id: PostId, user_id: UserId, vote: Vote) -> ForumResult<()>;

    async fn clear_vote(&self, post_id: PostId, user_id: UserId) -> ForumResult<()>;

    /// Recount the post's votes and store the counters on the post
    async fn refresh_vote_counts(&self, post_id: PostId) -> ForumResult<VoteTally>;
}
