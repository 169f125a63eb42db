//! Common middleware components
//!
//! Each filter is a plain `async fn(.., Request, Next) -> Response` used via
//! [`axum::middleware::from_fn`] / [`axum::middleware::from_fn_with_state`].
//! [`chain::RouteChain`] stacks them in the canonical order for one route.

pub mod chain;
pub mod cors;
pub mod csp;
pub mod error_page;
pub mod path_method;
pub mod rate_limit;
pub mod timeout;

pub use chain::RouteChain;
pub use error_page::{ErrorPage, ErrorPageRenderer};
