//! Database Module
//!
//! Connection management and schema migrations for the service's SQLite store.

pub mod connection;

// Re-export commonly used types
pub use connection::{connect_in_memory, run_migrations, DatabaseConfig, DatabasePool};
