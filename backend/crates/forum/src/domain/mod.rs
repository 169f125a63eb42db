//! Domain Layer

pub mod post;
pub mod repository;
pub mod vote;

pub use post::{NewPost, Post};
pub use repository::{PostRepository, VoteRepository};
pub use vote::{Vote, VoteTally};
