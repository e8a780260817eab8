//! Internship Model
//!
//! Stored postings and the nested JSON shape they are served in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Currency recorded when a stipend amount is given without one
pub const DEFAULT_STIPEND_CURRENCY: &str = "$";

/// Where the intern works
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum LocationType {
    Remote,
    Onsite,
    Hybrid,
}

/// Stored internship posting
///
/// `company_name` is a snapshot of the owner's name taken at creation time.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Internship {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub domain: String,
    pub company_name: String,
    pub company_id: String,
    pub location_type: LocationType,
    pub city: Option<String>,
    pub country: Option<String>,
    pub duration: String,
    pub stipend_amount: Option<i64>,
    pub stipend_currency: Option<String>,
    pub application_deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new posting
#[derive(Debug, Clone)]
pub struct NewInternship {
    pub title: String,
    pub description: String,
    pub domain: String,
    pub location_type: LocationType,
    pub city: Option<String>,
    pub country: Option<String>,
    pub duration: String,
    pub stipend_amount: Option<i64>,
    pub stipend_currency: Option<String>,
    pub application_deadline: DateTime<Utc>,
}

/// Validated partial update for an existing posting; `None` leaves a column as is
#[derive(Debug, Clone, Default)]
pub struct InternshipChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub location_type: Option<LocationType>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub duration: Option<String>,
    pub stipend_amount: Option<i64>,
    pub stipend_currency: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stipend {
    pub amount: i64,
    pub currency: Option<String>,
}

/// Client-facing internship shape
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternshipResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub domain: String,
    pub company: CompanyRef,
    pub location: Location,
    pub duration: String,
    pub stipend: Option<Stipend>,
    pub application_deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Internship> for InternshipResponse {
    fn from(internship: Internship) -> Self {
        let stipend = internship.stipend_amount.map(|amount| Stipend {
            amount,
            currency: internship.stipend_currency,
        });

        Self {
            id: internship.id,
            title: internship.title,
            description: internship.description,
            domain: internship.domain,
            company: CompanyRef {
                id: internship.company_id,
                name: internship.company_name,
            },
            location: Location {
                location_type: internship.location_type,
                city: internship.city,
                country: internship.country,
            },
            duration: internship.duration,
            stipend,
            application_deadline: internship.application_deadline,
            created_at: internship.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn internship(stipend_amount: Option<i64>) -> Internship {
        Internship {
            id: 7,
            title: "Backend Intern".to_string(),
            description: "Build APIs".to_string(),
            domain: "Eng".to_string(),
            company_name: "Acme".to_string(),
            company_id: "company-uid".to_string(),
            location_type: LocationType::Hybrid,
            city: Some("Lisbon".to_string()),
            country: Some("Portugal".to_string()),
            duration: "3mo".to_string(),
            stipend_amount,
            stipend_currency: stipend_amount.map(|_| "EUR".to_string()),
            application_deadline: Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap(),
        }
    }

    fn keys(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_nested_shape() {
        let value = serde_json::to_value(InternshipResponse::from(internship(Some(1200)))).unwrap();

        assert_eq!(
            keys(&value),
            vec![
                "applicationDeadline",
                "company",
                "createdAt",
                "description",
                "domain",
                "duration",
                "id",
                "location",
                "stipend",
                "title"
            ]
        );
        assert_eq!(value["company"], json!({"id": "company-uid", "name": "Acme"}));
        assert_eq!(
            value["location"],
            json!({"type": "hybrid", "city": "Lisbon", "country": "Portugal"})
        );
        assert_eq!(value["stipend"], json!({"amount": 1200, "currency": "EUR"}));
        assert_eq!(value["applicationDeadline"], "2025-12-31T00:00:00Z");
        assert_eq!(value["createdAt"], "2025-06-10T12:00:00Z");
    }

    #[test]
    fn test_stipend_null_iff_amount_unset() {
        let without = serde_json::to_value(InternshipResponse::from(internship(None))).unwrap();
        assert!(without["stipend"].is_null());

        let zero = serde_json::to_value(InternshipResponse::from(internship(Some(0)))).unwrap();
        assert_eq!(zero["stipend"]["amount"], 0);
    }

    #[test]
    fn test_location_type_serde() {
        let parsed: LocationType = serde_json::from_str("\"onsite\"").unwrap();
        assert_eq!(parsed, LocationType::Onsite);
        assert!(serde_json::from_str::<LocationType>("\"on-site\"").is_err());
    }
}
