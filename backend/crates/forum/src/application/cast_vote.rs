//! Cast Vote Use Case

use std::sync::Arc;

use kernel::id::{PostId, UserId};

use crate::domain::repository::{PostRepository, VoteRepository};
use crate::domain::vote::{Vote, VoteTally};
use crate::error::{ForumError, ForumResult};

/// Counters after the vote and the vote the user now holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub tally: VoteTally,
    pub vote: Option<Vote>,
}

/// Validate the `post_id` and `vote` form fields
pub fn parse_vote_form(post_id: Option<&str>, vote: Option<&str>) -> ForumResult<(PostId, Vote)> {
    let (Some(post_id), Some(vote)) = (
        post_id.filter(|v| !v.is_empty()),
        vote.filter(|v| !v.is_empty()),
    ) else {
        return Err(ForumError::MissingVoteFields);
    };

    let post_id = post_id
        .trim()
        .parse::<i64>()
        .map_err(|_| ForumError::InvalidPostId)?;
    let vote = vote.parse::<Vote>()?;

    Ok((PostId::new(post_id), vote))
}

pub struct CastVoteUseCase<R>
where
    R: PostRepository + VoteRepository,
{
    repo: Arc<R>,
}

impl<R> CastVoteUseCase<R>
where
    R: PostRepository + VoteRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        post_id: PostId,
        requested: Vote,
    ) -> ForumResult<VoteOutcome> {
        if self.repo.find_post(post_id).await?.is_none() {
            return Err(ForumError::PostNotFound);
        }

        let current = self.repo.find_vote(post_id, user_id).await?;
        let next = Vote::toggle(current, requested);

        match next {
            Some(vote) => self.repo.set_vote(post_id, user_id, vote).await?,
            None => self.repo.clear_vote(post_id, user_id).await?,
        }

        let tally = self.repo.refresh_vote_counts(post_id).await?;

        tracing::debug!(
            post_id = %post_id,
            user_id = %user_id,
            likes = tally.likes,
            dislikes = tally.dislikes,
            "Vote recorded"
        );

        Ok(VoteOutcome { tally, vote: next })
    }
}
