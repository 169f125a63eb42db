//! Application Layer

pub mod cast_vote;

pub use cast_vote::{CastVoteUseCase, VoteOutcome, parse_vote_form};
