//! User Service Implementation
//!
//! Account registration, lookup, and profile management.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use validator::Validate;

use crate::models::{
    requests::{CreateUserRequest, UpdateProfileRequest},
    user::{Role, StudentProfile, User},
};
use crate::utils::{
    error::AppError,
    validation::{format_validation_errors, normalize_email},
};

/// Custom error types for the user service
#[derive(Error, Debug)]
pub enum UserServiceError {
    /// No account exists for the subject
    #[error("User not found")]
    UserNotFound,

    /// Another subject already registered this email
    #[error("Email already exists")]
    EmailAlreadyExists,

    /// Input validation failed with detailed error message
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::UserNotFound => AppError::NotFound("User not found".to_string()),
            UserServiceError::EmailAlreadyExists => {
                AppError::Conflict("Email already exists".to_string())
            }
            UserServiceError::ValidationError(msg) => AppError::Validation(msg),
            UserServiceError::DatabaseError(e) => AppError::Database(e),
        }
    }
}

/// Result type for user service operations
pub type UserServiceResult<T> = Result<T, UserServiceError>;

/// Outcome of a self-registration call
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    /// `false` when the subject was already registered
    pub created: bool,
}

/// Outcome of a profile update
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub user: User,
    pub profile: Option<StudentProfile>,
    /// Set when the display name actually changed
    pub name_changed: bool,
}

/// Account and profile operations
#[derive(Clone)]
pub struct UserService {
    /// Database connection pool
    db_pool: SqlitePool,
}

impl UserService {
    /// Creates a new UserService instance with the provided database connection pool
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    /// Registers the subject, or returns the existing account untouched
    ///
    /// Student accounts get their profile row in the same transaction.
    pub async fn create_user(
        &self,
        subject: &str,
        request: CreateUserRequest,
    ) -> UserServiceResult<Registration> {
        request
            .validate()
            .map_err(|e| UserServiceError::ValidationError(format_validation_errors(&e)))?;

        let email = normalize_email(&request.email);
        let name = request.name.trim().to_string();

        let mut tx = self.db_pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(subject)
        .bind(&email)
        .bind(&name)
        .bind(request.role)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                UserServiceError::EmailAlreadyExists
            }
            other => UserServiceError::DatabaseError(other),
        })?
        .rows_affected();

        if inserted == 1 && request.role == Role::Student {
            Self::insert_default_profile(&mut tx, subject).await?;
        }

        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, role, created_at FROM users WHERE id = ?",
        )
        .bind(subject)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if inserted == 1 {
            log::info!("Registered {} account {}", user.role, user.id);
        } else {
            log::debug!("Account {} already registered", user.id);
        }

        Ok(Registration {
            user,
            created: inserted == 1,
        })
    }

    /// Fetches the account for a subject
    pub async fn get_user(&self, subject: &str) -> UserServiceResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, name, role, created_at FROM users WHERE id = ?",
        )
        .bind(subject)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(UserServiceError::UserNotFound)
    }

    /// Returns the student's profile, inserting the default (empty) one if missing
    pub async fn get_or_create_profile(&self, user_id: &str) -> UserServiceResult<StudentProfile> {
        let mut conn = self.db_pool.acquire().await?;

        sqlx::query(
            "INSERT INTO student_profiles (user_id) VALUES (?) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        let profile = sqlx::query_as::<_, StudentProfile>(
            "SELECT skills, bio, university FROM student_profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(profile)
    }

    /// Loads the profile block appropriate for the account's role
    pub async fn get_profile(&self, user: &User) -> UserServiceResult<Option<StudentProfile>> {
        match user.role {
            Role::Student => Ok(Some(self.get_or_create_profile(&user.id).await?)),
            Role::Company => Ok(None),
        }
    }

    /// Applies the keys present in the request and leaves the rest untouched
    ///
    /// Company accounts only carry a name; student-only keys are ignored for them.
    pub async fn update_profile(
        &self,
        user: User,
        request: UpdateProfileRequest,
    ) -> UserServiceResult<ProfileUpdate> {
        request
            .validate()
            .map_err(|e| UserServiceError::ValidationError(format_validation_errors(&e)))?;

        let new_name = request
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| *name != user.name);

        let mut tx = self.db_pool.begin().await?;

        if let Some(name) = &new_name {
            sqlx::query("UPDATE users SET name = ? WHERE id = ?")
                .bind(name)
                .bind(&user.id)
                .execute(&mut *tx)
                .await?;
        }

        let profile = if user.is_student() {
            Self::insert_default_profile(&mut tx, &user.id).await?;

            let profile = sqlx::query_as::<_, StudentProfile>(
                r#"
                UPDATE student_profiles
                SET skills = COALESCE(?, skills),
                    bio = COALESCE(?, bio),
                    university = COALESCE(?, university)
                WHERE user_id = ?
                RETURNING skills, bio, university
                "#,
            )
            .bind(request.skills)
            .bind(request.bio)
            .bind(request.university)
            .bind(&user.id)
            .fetch_one(&mut *tx)
            .await?;

            Some(profile)
        } else {
            None
        };

        tx.commit().await?;

        let name_changed = new_name.is_some();
        let user = match new_name {
            Some(name) => User { name, ..user },
            None => user,
        };

        log::info!("Updated profile for {}", user.id);

        Ok(ProfileUpdate {
            user,
            profile,
            name_changed,
        })
    }

    /// Health check for the store behind the service
    pub async fn health_check(&self) -> UserServiceResult<()> {
        sqlx::query("SELECT 1").execute(&self.db_pool).await?;
        Ok(())
    }

    async fn insert_default_profile(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        user_id: &str,
    ) -> UserServiceResult<()> {
        sqlx::query(
            "INSERT INTO student_profiles (user_id) VALUES (?) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connect_in_memory;

    async fn service() -> UserService {
        UserService::new(connect_in_memory().await.unwrap())
    }

    fn registration(name: &str, email: &str, role: Role) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            role,
        }
    }

    async fn count_users(service: &UserService) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&service.db_pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_user_is_idempotent() {
        let service = service().await;
        let request = registration("Ada", "Ada@Example.com", Role::Student);

        let first = service.create_user("uid-1", request.clone()).await.unwrap();
        assert!(first.created);
        assert_eq!(first.user.email, "ada@example.com");

        let second = service.create_user("uid-1", request).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.user.id, "uid-1");
        assert_eq!(count_users(&service).await, 1);
    }

    #[tokio::test]
    async fn test_create_student_creates_profile() {
        let service = service().await;
        service
            .create_user("uid-1", registration("Ada", "ada@example.com", Role::Student))
            .await
            .unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM student_profiles WHERE user_id = 'uid-1'")
                .fetch_one(&service.db_pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_create_company_has_no_profile() {
        let service = service().await;
        service
            .create_user("acme", registration("Acme", "hr@acme.io", Role::Company))
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM student_profiles")
            .fetch_one(&service.db_pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_for_other_subject_conflicts() {
        let service = service().await;
        service
            .create_user("uid-1", registration("Ada", "ada@example.com", Role::Student))
            .await
            .unwrap();

        let result = service
            .create_user("uid-2", registration("Eve", "ada@example.com", Role::Student))
            .await;
        assert!(matches!(result, Err(UserServiceError::EmailAlreadyExists)));
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let service = service().await;
        let result = service
            .create_user("uid-1", registration("", "nope", Role::Student))
            .await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let service = service().await;
        assert!(matches!(
            service.get_user("ghost").await,
            Err(UserServiceError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_profile_created_lazily() {
        let service = service().await;
        sqlx::query(
            "INSERT INTO users (id, email, name, role, created_at) VALUES ('uid-9', 'x@y.io', 'X', 'student', ?)",
        )
        .bind(Utc::now())
        .execute(&service.db_pool)
        .await
        .unwrap();

        let profile = service.get_or_create_profile("uid-9").await.unwrap();
        assert_eq!(profile, StudentProfile::default());

        let again = service.get_or_create_profile("uid-9").await.unwrap();
        assert_eq!(again, StudentProfile::default());
    }

    #[tokio::test]
    async fn test_partial_profile_update() {
        let service = service().await;
        let user = service
            .create_user("uid-1", registration("Ada", "ada@example.com", Role::Student))
            .await
            .unwrap()
            .user;

        let first = service
            .update_profile(
                user,
                UpdateProfileRequest {
                    skills: Some("Rust".to_string()),
                    university: Some("ETH".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let second = service
            .update_profile(
                first.user,
                UpdateProfileRequest {
                    bio: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!second.name_changed);
        assert_eq!(second.user.name, "Ada");
        let profile = second.profile.unwrap();
        assert_eq!(profile.bio.as_deref(), Some("x"));
        assert_eq!(profile.skills.as_deref(), Some("Rust"));
        assert_eq!(profile.university.as_deref(), Some("ETH"));
    }

    #[tokio::test]
    async fn test_name_update_persists() {
        let service = service().await;
        let user = service
            .create_user("acme", registration("Acme", "hr@acme.io", Role::Company))
            .await
            .unwrap()
            .user;

        let update = service
            .update_profile(
                user,
                UpdateProfileRequest {
                    name: Some("Acme Corp".to_string()),
                    bio: Some("ignored".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(update.name_changed);
        assert!(update.profile.is_none());
        assert_eq!(service.get_user("acme").await.unwrap().name, "Acme Corp");
    }
}
