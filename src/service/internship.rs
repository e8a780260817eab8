//! Internship Service Implementation
//!
//! Posting lifecycle: listing, creation by company accounts, owner edits and
//! deletion.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;

use crate::models::{
    internship::{Internship, InternshipChanges, NewInternship},
    user::User,
};
use crate::utils::error::AppError;

const INTERNSHIP_COLUMNS: &str = "id, title, description, domain, company_name, company_id, \
     location_type, city, country, duration, stipend_amount, stipend_currency, \
     application_deadline, created_at";

/// Errors shared by the posting, bookmark and application services
#[derive(Error, Debug)]
pub enum InternshipServiceError {
    #[error("Internship not found")]
    InternshipNotFound,

    /// The caller does not own the posting
    #[error("Internship belongs to another company")]
    NotOwner,

    #[error("Internship has applications and cannot be deleted")]
    HasApplications,

    #[error("Internship is not saved")]
    NotSaved,

    #[error("Already applied to this internship")]
    AlreadyApplied,

    #[error("Application deadline has passed")]
    DeadlinePassed,

    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<InternshipServiceError> for AppError {
    fn from(err: InternshipServiceError) -> Self {
        match err {
            InternshipServiceError::InternshipNotFound => {
                AppError::NotFound("Internship not found".to_string())
            }
            InternshipServiceError::NotOwner => {
                AppError::Forbidden("Only the posting company can modify this internship".into())
            }
            InternshipServiceError::HasApplications => AppError::Conflict(
                "Internship has applications and cannot be deleted".to_string(),
            ),
            InternshipServiceError::NotSaved => {
                AppError::NotFound("Internship is not saved".to_string())
            }
            InternshipServiceError::AlreadyApplied => {
                AppError::Conflict("Already applied to this internship".to_string())
            }
            InternshipServiceError::DeadlinePassed => {
                AppError::Validation("Application deadline has passed".to_string())
            }
            InternshipServiceError::DatabaseError(e) => AppError::Database(e),
        }
    }
}

/// Result type for internship-related service operations
pub type InternshipServiceResult<T> = Result<T, InternshipServiceError>;

/// Posting operations
#[derive(Clone)]
pub struct InternshipService {
    db_pool: SqlitePool,
}

impl InternshipService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    /// All postings, newest first
    pub async fn list_internships(&self) -> InternshipServiceResult<Vec<Internship>> {
        let sql = format!(
            "SELECT {} FROM internships ORDER BY created_at DESC, id DESC",
            INTERNSHIP_COLUMNS
        );
        let internships = sqlx::query_as::<_, Internship>(&sql)
            .fetch_all(&self.db_pool)
            .await?;
        Ok(internships)
    }

    /// Postings owned by one company, newest first
    pub async fn list_by_company(
        &self,
        company_id: &str,
    ) -> InternshipServiceResult<Vec<Internship>> {
        let sql = format!(
            "SELECT {} FROM internships WHERE company_id = ? ORDER BY created_at DESC, id DESC",
            INTERNSHIP_COLUMNS
        );
        let internships = sqlx::query_as::<_, Internship>(&sql)
            .bind(company_id)
            .fetch_all(&self.db_pool)
            .await?;
        Ok(internships)
    }

    pub async fn get_internship(&self, id: i64) -> InternshipServiceResult<Internship> {
        let sql = format!("SELECT {} FROM internships WHERE id = ?", INTERNSHIP_COLUMNS);
        sqlx::query_as::<_, Internship>(&sql)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(InternshipServiceError::InternshipNotFound)
    }

    /// Loads postings by id, returned in the order of `ids`
    ///
    /// Ids with no posting are skipped. An empty input never touches the store.
    pub async fn find_many(&self, ids: &[i64]) -> InternshipServiceResult<Vec<Internship>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM internships WHERE id IN (",
            INTERNSHIP_COLUMNS
        ));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let mut by_id: HashMap<i64, Internship> = builder
            .build_query_as::<Internship>()
            .fetch_all(&self.db_pool)
            .await?
            .into_iter()
            .map(|internship| (internship.id, internship))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Creates a posting owned by `company`
    ///
    /// The company name is copied from the owner's current display name.
    pub async fn create_internship(
        &self,
        company: &User,
        new: NewInternship,
    ) -> InternshipServiceResult<Internship> {
        let sql = format!(
            r#"
            INSERT INTO internships (
                title, description, domain, company_name, company_id, location_type,
                city, country, duration, stipend_amount, stipend_currency,
                application_deadline, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            INTERNSHIP_COLUMNS
        );

        let internship = sqlx::query_as::<_, Internship>(&sql)
            .bind(new.title)
            .bind(new.description)
            .bind(new.domain)
            .bind(&company.name)
            .bind(&company.id)
            .bind(new.location_type)
            .bind(new.city)
            .bind(new.country)
            .bind(new.duration)
            .bind(new.stipend_amount)
            .bind(new.stipend_currency)
            .bind(new.application_deadline)
            .bind(Utc::now())
            .fetch_one(&self.db_pool)
            .await?;

        log::info!(
            "Company {} created internship {} ({})",
            company.id,
            internship.id,
            internship.title
        );
        Ok(internship)
    }

    /// Applies a partial update to a posting owned by `company`
    pub async fn update_internship(
        &self,
        company: &User,
        id: i64,
        changes: InternshipChanges,
    ) -> InternshipServiceResult<Internship> {
        let existing = self.get_internship(id).await?;
        if existing.company_id != company.id {
            return Err(InternshipServiceError::NotOwner);
        }

        let sql = format!(
            r#"
            UPDATE internships
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                domain = COALESCE(?, domain),
                location_type = COALESCE(?, location_type),
                city = COALESCE(?, city),
                country = COALESCE(?, country),
                duration = COALESCE(?, duration),
                stipend_amount = COALESCE(?, stipend_amount),
                stipend_currency = COALESCE(?, stipend_currency, CASE WHEN ? IS NOT NULL THEN '$' END),
                application_deadline = COALESCE(?, application_deadline)
            WHERE id = ?
            RETURNING {}
            "#,
            INTERNSHIP_COLUMNS
        );

        let internship = sqlx::query_as::<_, Internship>(&sql)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.domain)
            .bind(changes.location_type)
            .bind(changes.city)
            .bind(changes.country)
            .bind(changes.duration)
            .bind(changes.stipend_amount)
            .bind(changes.stipend_currency)
            .bind(changes.stipend_amount)
            .bind(changes.application_deadline)
            .bind(id)
            .fetch_one(&self.db_pool)
            .await?;

        log::info!("Company {} updated internship {}", company.id, id);
        Ok(internship)
    }

    /// Deletes a posting owned by `company`
    ///
    /// Bookmarks of the posting are removed with it; postings that received
    /// applications are kept.
    pub async fn delete_internship(&self, company: &User, id: i64) -> InternshipServiceResult<()> {
        let mut tx = self.db_pool.begin().await?;

        let owner: Option<String> =
            sqlx::query_scalar("SELECT company_id FROM internships WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        match owner {
            None => return Err(InternshipServiceError::InternshipNotFound),
            Some(owner) if owner != company.id => return Err(InternshipServiceError::NotOwner),
            Some(_) => {}
        }

        let applications: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE internship_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if applications > 0 {
            return Err(InternshipServiceError::HasApplications);
        }

        sqlx::query("DELETE FROM internships WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        log::info!("Company {} deleted internship {}", company.id, id);
        Ok(())
    }
}
