//! Service Layer
//!
//! Business logic and data access for accounts, postings, bookmarks and
//! applications, plus the identity provider seam.

pub mod application_service;
pub mod identity;
pub mod internship;
pub mod saved;
pub mod user;

// Re-export services
pub use application_service::ApplicationService;
pub use identity::{IdentityError, IdentityProvider, JwtIdentityProvider};
pub use internship::{InternshipService, InternshipServiceError};
pub use saved::{SaveOutcome, SavedInternshipService};
pub use user::{UserService, UserServiceError};
