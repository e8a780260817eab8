//! Validation Utilities
//!
//! Input validation helpers shared by request payloads and services.

use chrono::{DateTime, NaiveDate, Utc};
use validator::{ValidationError, ValidationErrors};

use crate::utils::error::{AppError, AppResult};

/// Date format accepted for application deadlines
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Normalizes email address to lowercase and removes whitespace
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns a trimmed copy of the input, or `None` when nothing remains
pub fn non_empty_trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an application deadline given as `YYYY-MM-DD` into midnight UTC
pub fn parse_deadline(value: &str) -> AppResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value.trim(), DEADLINE_FORMAT).map_err(|_| {
        AppError::Validation(format!(
            "applicationDeadline: {} (expected YYYY-MM-DD)",
            messages::INVALID_DATE
        ))
    })?;

    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::Validation(messages::INVALID_DATE.to_string()))
}

/// Custom validator rejecting strings that are empty after trimming
pub fn not_blank_validator(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(messages::FIELD_REQUIRED.into());
        Err(error)
    } else {
        Ok(())
    }
}

/// Rejects negative stipend amounts
pub fn validate_stipend(amount: Option<i64>) -> AppResult<Option<i64>> {
    match amount {
        Some(value) if value < 0 => Err(AppError::Validation(format!(
            "stipendAmount: {}",
            messages::NEGATIVE_STIPEND
        ))),
        other => Ok(other),
    }
}

/// Flattens validator output into a single `field: message` list
pub fn format_validation_errors(err: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, errors) in err.field_errors() {
        for error in errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for field '{}'", field));
            messages.push(format!("{}: {}", field, message));
        }
    }

    messages.sort();
    messages.join(", ")
}

/// Validation error messages for user-friendly responses
pub mod messages {
    pub const INVALID_DATE: &str = "Invalid date format";
    pub const FIELD_REQUIRED: &str = "This field is required";
    pub const NEGATIVE_STIPEND: &str = "Stipend amount cannot be negative";
}
