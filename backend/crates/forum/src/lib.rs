//! Forum Backend Module
//!
//! The thin forum surface around the auth core:
//! - `domain/` - Posts, votes, repository traits
//! - `application/` - Vote casting
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - Vote endpoint, home page, error page renderer

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use error::{ForumError, ForumResult};
pub use infra::{MemoryForumRepository, PgForumRepository};
pub use presentation::{ForumAppState, ForumRouteChains, forum_router, render_error_page};
