//! Saved Internship Service
//!
//! Bookmarks between an account and a posting. Uniqueness of the
//! (student, internship) pair is enforced by the schema, so concurrent saves
//! can never produce duplicates.

use sqlx::SqlitePool;

use crate::models::internship::Internship;
use crate::service::internship::{
    InternshipService, InternshipServiceError, InternshipServiceResult,
};

/// Result of a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
}

#[derive(Clone)]
pub struct SavedInternshipService {
    db_pool: SqlitePool,
    internships: InternshipService,
}

impl SavedInternshipService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            internships: InternshipService::new(db_pool.clone()),
            db_pool,
        }
    }

    /// Full postings bookmarked by the student, most recently saved first
    pub async fn list_saved(&self, student_id: &str) -> InternshipServiceResult<Vec<Internship>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT internship_id FROM saved_internships WHERE student_id = ? ORDER BY id DESC",
        )
        .bind(student_id)
        .fetch_all(&self.db_pool)
        .await?;

        self.internships.find_many(&ids).await
    }

    /// Bookmarks a posting; saving twice is a no-op
    pub async fn save(
        &self,
        student_id: &str,
        internship_id: i64,
    ) -> InternshipServiceResult<SaveOutcome> {
        self.internships.get_internship(internship_id).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO saved_internships (student_id, internship_id)
            VALUES (?, ?)
            ON CONFLICT (student_id, internship_id) DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(internship_id)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        if inserted == 0 {
            log::debug!("{} already saved internship {}", student_id, internship_id);
            return Ok(SaveOutcome::AlreadySaved);
        }

        log::info!("{} saved internship {}", student_id, internship_id);
        Ok(SaveOutcome::Saved)
    }

    /// Removes a bookmark; fails when there is nothing to remove
    pub async fn unsave(&self, student_id: &str, internship_id: i64) -> InternshipServiceResult<()> {
        let deleted =
            sqlx::query("DELETE FROM saved_internships WHERE student_id = ? AND internship_id = ?")
                .bind(student_id)
                .bind(internship_id)
                .execute(&self.db_pool)
                .await?
                .rows_affected();

        if deleted == 0 {
            return Err(InternshipServiceError::NotSaved);
        }

        log::info!("{} unsaved internship {}", student_id, internship_id);
        Ok(())
    }
}
