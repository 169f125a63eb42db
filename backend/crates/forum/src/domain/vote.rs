//! Votes on posts

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ForumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Like,
    Dislike,
}

impl Vote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vote::Like => "like",
            Vote::Dislike => "dislike",
        }
    }

    /// Vote held after `requested` is cast on top of `current`.
    ///
    /// Casting the held vote again withdraws it; the opposite vote replaces it.
    pub fn toggle(current: Option<Vote>, requested: Vote) -> Option<Vote> {
        match current {
            Some(held) if held == requested => None,
            _ => Some(requested),
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vote {
    type Err = ForumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Vote::Like),
            "dislike" => Ok(Vote::Dislike),
            _ => Err(ForumError::InvalidVote),
        }
    }
}

/// Counters of a post after a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VoteTally {
    pub likes: i64,
    pub dislikes: i64,
}
