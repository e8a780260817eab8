//! Request and Response Models
//!
//! Data structures for API request and response payloads with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::internship::{
    InternshipChanges, LocationType, NewInternship, DEFAULT_STIPEND_CURRENCY,
};
use crate::models::user::Role;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{
    format_validation_errors, non_empty_trimmed, not_blank_validator, parse_deadline,
    validate_stipend,
};

/// Request payload for self-registration after signing in with the identity provider
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Display name
    #[validate(custom(function = "not_blank_validator"))]
    pub name: String,

    /// Email address (must be unique)
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    /// Account role; fixed for the lifetime of the account
    pub role: Role,
}

/// Partial update for `PUT /api/me/profile`
///
/// Absent (or null) keys leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "not_blank_validator"))]
    pub name: Option<String>,
    pub skills: Option<String>,
    pub bio: Option<String>,
    pub university: Option<String>,
}

/// Request payload for `POST /api/internships`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInternshipRequest {
    #[validate(custom(function = "not_blank_validator"))]
    pub title: String,

    #[validate(custom(function = "not_blank_validator"))]
    pub description: String,

    #[validate(custom(function = "not_blank_validator"))]
    pub domain: String,

    pub location_type: LocationType,
    pub city: Option<String>,
    pub country: Option<String>,

    #[validate(custom(function = "not_blank_validator"))]
    pub duration: String,

    pub stipend_amount: Option<i64>,
    pub stipend_currency: Option<String>,

    /// Deadline date as `YYYY-MM-DD`
    pub application_deadline: String,
}

impl CreateInternshipRequest {
    /// Validates the payload and converts it into store input
    pub fn into_new_internship(self) -> AppResult<NewInternship> {
        self.validate()
            .map_err(|e| AppError::Validation(format_validation_errors(&e)))?;

        let application_deadline = parse_deadline(&self.application_deadline)?;
        let stipend_amount = validate_stipend(self.stipend_amount)?;
        let stipend_currency = stipend_amount.map(|_| {
            non_empty_trimmed(self.stipend_currency)
                .unwrap_or_else(|| DEFAULT_STIPEND_CURRENCY.to_string())
        });

        Ok(NewInternship {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            domain: self.domain.trim().to_string(),
            location_type: self.location_type,
            city: non_empty_trimmed(self.city),
            country: non_empty_trimmed(self.country),
            duration: self.duration.trim().to_string(),
            stipend_amount,
            stipend_currency,
            application_deadline,
        })
    }
}

/// Partial update for `PUT /api/internships/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInternshipRequest {
    #[validate(custom(function = "not_blank_validator"))]
    pub title: Option<String>,

    #[validate(custom(function = "not_blank_validator"))]
    pub description: Option<String>,

    #[validate(custom(function = "not_blank_validator"))]
    pub domain: Option<String>,

    pub location_type: Option<LocationType>,
    pub city: Option<String>,
    pub country: Option<String>,

    #[validate(custom(function = "not_blank_validator"))]
    pub duration: Option<String>,

    pub stipend_amount: Option<i64>,
    pub stipend_currency: Option<String>,
    pub application_deadline: Option<String>,
}

impl UpdateInternshipRequest {
    /// Validates the payload and converts it into a column-wise change set
    pub fn into_changes(self) -> AppResult<InternshipChanges> {
        self.validate()
            .map_err(|e| AppError::Validation(format_validation_errors(&e)))?;

        let application_deadline = self
            .application_deadline
            .as_deref()
            .map(parse_deadline)
            .transpose()?;

        Ok(InternshipChanges {
            title: self.title.map(|v| v.trim().to_string()),
            description: self.description.map(|v| v.trim().to_string()),
            domain: self.domain.map(|v| v.trim().to_string()),
            location_type: self.location_type,
            city: non_empty_trimmed(self.city),
            country: non_empty_trimmed(self.country),
            duration: self.duration.map(|v| v.trim().to_string()),
            stipend_amount: validate_stipend(self.stipend_amount)?,
            stipend_currency: non_empty_trimmed(self.stipend_currency),
            application_deadline,
        })
    }
}

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response for health check
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_payload() -> serde_json::Value {
        json!({
            "title": "X",
            "description": "Y",
            "domain": "Eng",
            "locationType": "remote",
            "duration": "3mo",
            "applicationDeadline": "2025-12-31"
        })
    }

    #[test]
    fn test_create_user_request_validation() {
        let request: CreateUserRequest = serde_json::from_value(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "role": "student"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.role, Role::Student);

        let invalid = CreateUserRequest {
            name: "  ".to_string(),
            email: "not-an-email".to_string(),
            role: Role::Company,
        };
        let errors = invalid.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }

    #[test]
    fn test_create_user_request_rejects_unknown_role() {
        let result = serde_json::from_value::<CreateUserRequest>(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "role": "admin"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_profile_request_absent_keys_are_none() {
        let request: UpdateProfileRequest = serde_json::from_value(json!({"bio": "x"})).unwrap();
        assert_eq!(request.bio.as_deref(), Some("x"));
        assert!(request.name.is_none());
        assert!(request.skills.is_none());
        assert!(request.university.is_none());
    }

    #[test]
    fn test_create_internship_minimal_payload() {
        let request: CreateInternshipRequest = serde_json::from_value(create_payload()).unwrap();
        let new = request.into_new_internship().unwrap();

        assert_eq!(new.location_type, LocationType::Remote);
        assert!(new.city.is_none());
        assert!(new.stipend_amount.is_none());
        assert!(new.stipend_currency.is_none());
        assert_eq!(new.application_deadline.to_rfc3339(), "2025-12-31T00:00:00+00:00");
    }

    #[test]
    fn test_create_internship_defaults_currency() {
        let mut payload = create_payload();
        payload["stipendAmount"] = json!(2500);
        payload["city"] = json!("  ");

        let request: CreateInternshipRequest = serde_json::from_value(payload).unwrap();
        let new = request.into_new_internship().unwrap();

        assert_eq!(new.stipend_amount, Some(2500));
        assert_eq!(new.stipend_currency.as_deref(), Some(DEFAULT_STIPEND_CURRENCY));
        assert!(new.city.is_none());
    }

    #[test]
    fn test_create_internship_bad_date() {
        let mut payload = create_payload();
        payload["applicationDeadline"] = json!("12/31/2025");

        let request: CreateInternshipRequest = serde_json::from_value(payload).unwrap();
        assert!(matches!(
            request.into_new_internship(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_create_internship_missing_field_fails_to_parse() {
        let mut payload = create_payload();
        payload.as_object_mut().unwrap().remove("title");
        assert!(serde_json::from_value::<CreateInternshipRequest>(payload).is_err());
    }

    #[test]
    fn test_update_internship_changes() {
        let request: UpdateInternshipRequest = serde_json::from_value(json!({
            "title": " Senior Intern ",
            "applicationDeadline": "2026-01-15"
        }))
        .unwrap();
        let changes = request.into_changes().unwrap();

        assert_eq!(changes.title.as_deref(), Some("Senior Intern"));
        assert!(changes.application_deadline.is_some());
        assert!(changes.description.is_none());
        assert!(changes.location_type.is_none());
    }

    #[test]
    fn test_update_internship_rejects_blank_title() {
        let request = UpdateInternshipRequest {
            title: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(request.into_changes().is_err());
    }
}
