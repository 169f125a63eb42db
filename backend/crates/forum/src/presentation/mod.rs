//! Presentation Layer

pub mod handlers;
pub mod pages;
pub mod router;

pub use handlers::ForumAppState;
pub use pages::render_error_page;
pub use router::{ForumRouteChains, forum_router};
