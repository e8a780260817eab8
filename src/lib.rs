//! InternHub Service Library
//!
//! Backend for an internship job board. Companies publish postings, students
//! keep a profile, bookmark postings and apply to them. Sign-in is delegated to
//! an external identity provider; this service only verifies its bearer tokens.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use internhub_service::{
//!     api::{AppState, RouterBuilder},
//!     database::{run_migrations, DatabaseConfig},
//!     service::JwtIdentityProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = DatabaseConfig::default().create_pool().await?;
//!     run_migrations(&pool).await?;
//!
//!     let identity = Arc::new(JwtIdentityProvider::with_secret("shared-secret"));
//!     let app = RouterBuilder::with_all_routes().build(AppState::new(pool, identity));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Router Builder
//!
//! Route groups can be switched on individually:
//!
//! ```rust,ignore
//! // Public listing mirror: health check and browsing only
//! let mirror = RouterBuilder::with_readonly_routes().build(state.clone());
//!
//! // Company dashboard backend
//! let dashboard = RouterBuilder::new()
//!     .health_check(true)
//!     .accounts(true)
//!     .postings(true)
//!     .build(state);
//! ```
//!
//! # Architecture
//!
//! - **API Layer**: handlers, bearer-token middleware and route groups
//! - **Service Layer**: accounts, postings, bookmarks, applications and the identity provider seam
//! - **Models**: stored records and their client-facing shapes
//! - **Database**: SQLite pool and embedded migrations
//! - **Utils**: error rendering and input validation

/// HTTP API layer with handlers and configurable routing
pub mod api;

/// Configuration read from the environment
pub mod config;

/// Database connection management and migrations
pub mod database;

/// Data models and request/response structures
pub mod models;

/// Business logic and identity provider integration
pub mod service;

/// Shared utilities for error handling and validation
pub mod utils;

// Re-export commonly used types for convenient access
pub use api::{create_routes, AppState, RouterBuilder};
pub use models::{
    application::{Application, ApplicationResponse, ApplicationStatus},
    internship::{Internship, InternshipResponse, LocationType},
    requests::{CreateInternshipRequest, CreateUserRequest, UpdateProfileRequest},
    user::{ProfileResponse, Role, User},
};
pub use service::{
    ApplicationService, IdentityProvider, InternshipService, JwtIdentityProvider,
    SavedInternshipService, UserService,
};
pub use utils::error::{AppError, AppResult, ErrorResponse};

// Re-export database utilities for configuration
pub use database::{DatabaseConfig, DatabasePool};

// Re-export configuration system
pub use config::{env, AppConfig, DatabaseSettings, IdentityConfig, ServerConfig};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
