//! Data Models Module
//!
//! This module contains all data structures used throughout the service:
//! stored records, their client-facing shapes, and request payloads.

pub mod application;
pub mod internship;
pub mod requests;
pub mod user;

// Re-export commonly used types
pub use application::*;
pub use internship::*;
pub use requests::*;
pub use user::*;
