//! User Model
//!
//! Accounts keyed by the identity provider's subject id, their role, and the
//! optional student profile attached to student accounts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed classification of an account, gating endpoint access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum Role {
    Student,
    Company,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Company => "company",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored account record
///
/// `id` is the subject id issued by the identity provider and never changes.
/// `name` is mutable through the profile endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Subject id from the identity provider
    pub id: String,

    /// Email address (unique, normalized)
    pub email: String,

    /// Display name
    pub name: String,

    /// Account role
    pub role: Role,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}

/// Student-only profile details, one row per student account
///
/// The default state (all fields `None`) is what gets inserted when a profile
/// is materialized on first access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentProfile {
    /// Free-text skills, conventionally comma-separated
    pub skills: Option<String>,
    pub bio: Option<String>,
    pub university: Option<String>,
}

/// Profile shape returned by `GET/PUT /api/me/profile`
///
/// Company accounts get the reduced shape without the student block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub student: Option<StudentProfile>,
}

impl ProfileResponse {
    pub fn new(user: User, profile: Option<StudentProfile>) -> Self {
        let student = match user.role {
            Role::Student => Some(profile.unwrap_or_default()),
            Role::Company => None,
        };

        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            student,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: "uid-1".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Student.to_string(), "student");
        assert_eq!(Role::Company.to_string(), "company");
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_value(Role::Student).unwrap(), "student");
        let role: Role = serde_json::from_str("\"company\"").unwrap();
        assert_eq!(role, Role::Company);
        assert!(serde_json::from_str::<Role>("\"Company\"").is_err());
    }

    #[test]
    fn test_student_profile_response_shape() {
        let profile = StudentProfile {
            skills: Some("Rust, SQL".to_string()),
            bio: None,
            university: Some("TU Delft".to_string()),
        };
        let value = serde_json::to_value(ProfileResponse::new(user(Role::Student), Some(profile)))
            .unwrap();

        assert_eq!(value["role"], "student");
        assert_eq!(value["skills"], "Rust, SQL");
        assert!(value["bio"].is_null());
        assert_eq!(value["university"], "TU Delft");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_student_without_profile_gets_defaults() {
        let value = serde_json::to_value(ProfileResponse::new(user(Role::Student), None)).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("skills"));
        assert!(object["skills"].is_null());
    }

    #[test]
    fn test_company_profile_is_reduced() {
        let value = serde_json::to_value(ProfileResponse::new(
            user(Role::Company),
            Some(StudentProfile::default()),
        ))
        .unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["createdAt", "email", "id", "name", "role"]);
    }
}
