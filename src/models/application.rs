//! Application and Bookmark Models
//!
//! Join records between a student account and an internship.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::internship::InternshipResponse;

/// Review state of an application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

/// Stored application of a student to an internship
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Application {
    pub id: i64,
    pub student_id: String,
    pub internship_id: i64,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// Stored bookmark; at most one per (student, internship)
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SavedInternship {
    pub id: i64,
    pub student_id: String,
    pub internship_id: i64,
}

/// Client-facing application shape with its internship nested
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: i64,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub internship: InternshipResponse,
}

impl ApplicationResponse {
    pub fn new(application: Application, internship: InternshipResponse) -> Self {
        Self {
            id: application.id,
            status: application.status,
            applied_at: application.applied_at,
            internship,
        }
    }
}
