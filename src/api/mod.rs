//! API Layer
//!
//! HTTP API endpoints and request handling for the job board.

pub mod handlers;
pub mod middleware;
pub mod routes;

// Re-export commonly used types
pub use handlers::AppState;
pub use middleware::{auth_middleware, extract_auth_user, AuthUser};
pub use routes::{create_readonly_routes, create_routes, RouterBuilder};
