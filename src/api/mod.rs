//! HTTP API module.
//!
//! Provides the backend proxy and its supporting endpoints.

mod error;
mod handlers;
mod proxy;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use proxy::normalize_response;
pub use routes::{PROXY_PREFIX, create_router};
pub use state::AppState;
