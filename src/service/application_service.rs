//! Application Service
//!
//! Students applying to postings and reviewing what they applied to.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::models::{application::Application, internship::Internship, user::User};
use crate::service::internship::{
    InternshipService, InternshipServiceError, InternshipServiceResult,
};

#[derive(Clone)]
pub struct ApplicationService {
    db_pool: SqlitePool,
    internships: InternshipService,
}

impl ApplicationService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            internships: InternshipService::new(db_pool.clone()),
            db_pool,
        }
    }

    /// Records an application with status `pending`
    ///
    /// Applications are accepted through the whole deadline day (UTC).
    pub async fn apply(
        &self,
        student: &User,
        internship_id: i64,
    ) -> InternshipServiceResult<(Application, Internship)> {
        let internship = self.internships.get_internship(internship_id).await?;

        let now = Utc::now();
        if now >= internship.application_deadline + Duration::days(1) {
            return Err(InternshipServiceError::DeadlinePassed);
        }

        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (student_id, internship_id, applied_at)
            VALUES (?, ?, ?)
            ON CONFLICT (student_id, internship_id) DO NOTHING
            RETURNING id, student_id, internship_id, status, applied_at
            "#,
        )
        .bind(&student.id)
        .bind(internship_id)
        .bind(now)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(InternshipServiceError::AlreadyApplied)?;

        log::info!(
            "{} applied to internship {} (application {})",
            student.id,
            internship_id,
            application.id
        );
        Ok((application, internship))
    }

    /// The student's applications with their postings, newest first
    pub async fn list_for_student(
        &self,
        student_id: &str,
    ) -> InternshipServiceResult<Vec<(Application, Internship)>> {
        let applications = sqlx::query_as::<_, Application>(
            r#"
            SELECT id, student_id, internship_id, status, applied_at
            FROM applications
            WHERE student_id = ?
            ORDER BY applied_at DESC, id DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.db_pool)
        .await?;

        let ids: Vec<i64> = applications.iter().map(|a| a.internship_id).collect();
        let internships: HashMap<i64, Internship> = self
            .internships
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|internship| (internship.id, internship))
            .collect();

        // An application whose posting is gone is skipped rather than mismatched.
        Ok(applications
            .into_iter()
            .filter_map(|application| {
                internships
                    .get(&application.internship_id)
                    .cloned()
                    .map(|internship| (application, internship))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connect_in_memory;
    use crate::models::application::ApplicationStatus;
    use crate::models::user::Role;
    use crate::service::internship::tests::{insert_user, new_internship};

    async fn setup() -> (ApplicationService, InternshipService, User, User) {
        let pool = connect_in_memory().await.unwrap();
        let company = insert_user(&pool, "acme", Role::Company).await;
        let student = insert_user(&pool, "stu", Role::Student).await;
        (
            ApplicationService::new(pool.clone()),
            InternshipService::new(pool),
            company,
            student,
        )
    }

    #[tokio::test]
    async fn test_apply_defaults_to_pending() {
        let (service, internships, company, student) = setup().await;
        let posting = internships
            .create_internship(&company, new_internship("X"))
            .await
            .unwrap();

        let (application, internship) = service.apply(&student, posting.id).await.unwrap();
        assert_eq!(application.status, ApplicationStatus::Pending);
        assert_eq!(application.student_id, "stu");
        assert_eq!(internship.id, posting.id);
    }

    #[tokio::test]
    async fn test_apply_twice_conflicts() {
        let (service, internships, company, student) = setup().await;
        let posting = internships
            .create_internship(&company, new_internship("X"))
            .await
            .unwrap();

        service.apply(&student, posting.id).await.unwrap();
        assert!(matches!(
            service.apply(&student, posting.id).await,
            Err(InternshipServiceError::AlreadyApplied)
        ));
    }

    #[tokio::test]
    async fn test_apply_missing_internship() {
        let (service, _, _, student) = setup().await;
        assert!(matches!(
            service.apply(&student, 42).await,
            Err(InternshipServiceError::InternshipNotFound)
        ));
    }

    #[tokio::test]
    async fn test_apply_after_deadline() {
        let (service, internships, company, student) = setup().await;
        let mut expired = new_internship("Old");
        expired.application_deadline = Utc::now() - Duration::days(3);
        let posting = internships.create_internship(&company, expired).await.unwrap();

        assert!(matches!(
            service.apply(&student, posting.id).await,
            Err(InternshipServiceError::DeadlinePassed)
        ));
    }

    #[tokio::test]
    async fn test_list_for_student() {
        let (service, internships, company, student) = setup().await;
        let first = internships
            .create_internship(&company, new_internship("first"))
            .await
            .unwrap();
        let second = internships
            .create_internship(&company, new_internship("second"))
            .await
            .unwrap();

        service.apply(&student, first.id).await.unwrap();
        service.apply(&student, second.id).await.unwrap();

        let listed = service.list_for_student("stu").await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|(_, i)| i.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert!(listed.iter().all(|(a, i)| a.internship_id == i.id));
    }

    #[tokio::test]
    async fn test_list_skips_application_without_posting() {
        let (service, internships, company, student) = setup().await;
        let kept = internships
            .create_internship(&company, new_internship("kept"))
            .await
            .unwrap();
        let removed = internships
            .create_internship(&company, new_internship("removed"))
            .await
            .unwrap();

        service.apply(&student, kept.id).await.unwrap();
        service.apply(&student, removed.id).await.unwrap();

        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(&service.db_pool)
            .await
            .unwrap();
        sqlx::query("DELETE FROM internships WHERE id = ?")
            .bind(removed.id)
            .execute(&service.db_pool)
            .await
            .unwrap();

        let listed = service.list_for_student("stu").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].0.internship_id, kept.id);
        assert_eq!(listed[0].1.id, kept.id);
        assert_eq!(listed[0].1.title, "kept");
    }
}
