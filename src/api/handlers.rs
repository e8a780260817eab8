//! HTTP Request Handlers
//!
//! Axum handlers for processing HTTP requests and responses.
//!
//! Protected handlers resolve the caller in a fixed order: verified subject
//! (middleware), stored account, role, then payload. A caller with the wrong
//! role is refused before the body is looked at.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sqlx::SqlitePool;

use super::middleware::AuthUser;
use crate::{
    models::{
        application::ApplicationResponse,
        internship::InternshipResponse,
        requests::*,
        user::{ProfileResponse, Role, User},
    },
    service::{
        ApplicationService, IdentityProvider, InternshipService, SaveOutcome,
        SavedInternshipService, UserService,
    },
    utils::error::{AppError, AppResult},
    VERSION,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub internship_service: Arc<InternshipService>,
    pub saved_service: Arc<SavedInternshipService>,
    pub application_service: Arc<ApplicationService>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            user_service: Arc::new(UserService::new(db_pool.clone())),
            internship_service: Arc::new(InternshipService::new(db_pool.clone())),
            saved_service: Arc::new(SavedInternshipService::new(db_pool.clone())),
            application_service: Arc::new(ApplicationService::new(db_pool)),
            identity,
        }
    }
}

type Payload<T> = Result<Json<T>, JsonRejection>;
type InternshipId = Result<Path<i64>, PathRejection>;

async fn current_user(state: &AppState, subject: &str) -> AppResult<User> {
    Ok(state.user_service.get_user(subject).await?)
}

fn require_role(user: &User, role: Role) -> AppResult<()> {
    if user.role != role {
        return Err(AppError::Forbidden(format!(
            "Only {} accounts can perform this action",
            role
        )));
    }
    Ok(())
}

/// Register the signed-in subject (idempotent)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(AuthUser(subject)): Extension<AuthUser>,
    payload: Payload<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let Json(request) = payload?;

    let registration = state.user_service.create_user(&subject, request).await?;

    if registration.created {
        Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new("User created successfully")),
        ))
    } else {
        Ok((StatusCode::OK, Json(MessageResponse::new("User already exists"))))
    }
}

/// Get the caller's own profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(AuthUser(subject)): Extension<AuthUser>,
) -> AppResult<Json<ProfileResponse>> {
    let user = current_user(&state, &subject).await?;
    let profile = state.user_service.get_profile(&user).await?;
    Ok(Json(ProfileResponse::new(user, profile)))
}

/// Update the caller's own profile
///
/// A changed display name is pushed to the identity provider; a failed push
/// is logged and does not fail the request.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(AuthUser(subject)): Extension<AuthUser>,
    payload: Payload<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let user = current_user(&state, &subject).await?;
    let Json(request) = payload?;

    let update = state.user_service.update_profile(user, request).await?;

    if update.name_changed {
        if let Err(e) = state
            .identity
            .update_display_name(&update.user.id, &update.user.name)
            .await
        {
            log::warn!("Display name sync failed for {}: {}", update.user.id, e);
        }
    }

    Ok(Json(ProfileResponse::new(update.user, update.profile)))
}

/// List every posting, newest first
pub async fn list_internships(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<InternshipResponse>>> {
    let internships = state.internship_service.list_internships().await?;
    Ok(Json(internships.into_iter().map(Into::into).collect()))
}

/// Get a single posting
pub async fn get_internship(
    State(state): State<AppState>,
    id: InternshipId,
) -> AppResult<Json<InternshipResponse>> {
    let Path(id) = id?;
    let internship = state.internship_service.get_internship(id).await?;
    Ok(Json(internship.into()))
}

/// Publish a posting (company accounts)
pub async fn create_internship(
    State(state): State<AppState>,
    Extension(AuthUser(subject)): Extension<AuthUser>,
    payload: Payload<CreateInternshipRequest>,
) -> AppResult<(StatusCode, Json<InternshipResponse>)> {
    let company = current_user(&state, &subject).await?;
    require_role(&company, Role::Company)?;

    let Json(request) = payload?;
    let new_internship = request.into_new_internship()?;

    let internship = state
        .internship_service
        .create_internship(&company, new_internship)
        .await?;

    Ok((StatusCode::CREATED, Json(internship.into())))
}

/// Edit a posting (owning company)
pub async fn update_internship(
    State(state): State<AppState>,
    Extension(AuthUser(subject)): Extension<AuthUser>,
    id: InternshipId,
    payload: Payload<UpdateInternshipRequest>,
) -> AppResult<Json<InternshipResponse>> {
    let company = current_user(&state, &subject).await?;
    require_role(&company, Role::Company)?;

    let Path(id) = id?;
    let Json(request) = payload?;
    let changes = request.into_changes()?;

    let internship = state
        .internship_service
        .update_internship(&company, id, changes)
        .await?;

    Ok(Json(internship.into()))
}

/// Remove a posting (owning company)
pub async fn delete_internship(
    State(state): State<AppState>,
    Extension(AuthUser(subject)): Extension<AuthUser>,
    id: InternshipId,
) -> AppResult<Json<MessageResponse>> {
    let company = current_user(&state, &subject).await?;
    require_role(&company, Role::Company)?;

    let Path(id) = id?;
    state
        .internship_service
        .delete_internship(&company, id)
        .await?;

    Ok(Json(MessageResponse::new("Internship deleted")))
}

/// Postings published by the calling company
pub async fn list_company_internships(
    State(state): State<AppState>,
    Extension(AuthUser(subject)): Extension<AuthUser>,
) -> AppResult<Json<Vec<InternshipResponse>>> {
    let company = current_user(&state, &subject).await?;
    require_role(&company, Role::Company)?;

    let internships = state.internship_service.list_by_company(&company.id).await?;
    Ok(Json(internships.into_iter().map(Into::into).collect()))
}

/// Postings bookmarked by the caller
pub async fn list_saved(
    State(state): State<AppState>,
    Extension(AuthUser(subject)): Extension<AuthUser>,
) -> AppResult<Json<Vec<InternshipResponse>>> {
    let user = current_user(&state, &subject).await?;
    let internships = state.saved_service.list_saved(&user.id).await?;
    Ok(Json(internships.into_iter().map(Into::into).collect()))
}

/// Bookmark a posting (idempotent)
pub async fn save_internship(
    State(state): State<AppState>,
    Extension(AuthUser(subject)): Extension<AuthUser>,
    id: InternshipId,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let user = current_user(&state, &subject).await?;
    let Path(id) = id?;

    match state.saved_service.save(&user.id, id).await? {
        SaveOutcome::Saved => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new("Internship saved")),
        )),
        SaveOutcome::AlreadySaved => Ok((
            StatusCode::OK,
            Json(MessageResponse::new("Internship already saved")),
        )),
    }
}

/// Remove a bookmark
pub async fn unsave_internship(
    State(state): State<AppState>,
    Extension(AuthUser(subject)): Extension<AuthUser>,
    id: InternshipId,
) -> AppResult<Json<MessageResponse>> {
    let user = current_user(&state, &subject).await?;
    let Path(id) = id?;

    state.saved_service.unsave(&user.id, id).await?;
    Ok(Json(MessageResponse::new("Internship removed from saved")))
}

/// Apply to a posting (student accounts)
pub async fn apply(
    State(state): State<AppState>,
    Extension(AuthUser(subject)): Extension<AuthUser>,
    id: InternshipId,
) -> AppResult<(StatusCode, Json<ApplicationResponse>)> {
    let student = current_user(&state, &subject).await?;
    require_role(&student, Role::Student)?;

    let Path(id) = id?;
    let (application, internship) = state.application_service.apply(&student, id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::new(application, internship.into())),
    ))
}

/// The calling student's applications, newest first
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(AuthUser(subject)): Extension<AuthUser>,
) -> AppResult<Json<Vec<ApplicationResponse>>> {
    let student = current_user(&state, &subject).await?;
    require_role(&student, Role::Student)?;

    let applications = state
        .application_service
        .list_for_student(&student.id)
        .await?;

    Ok(Json(
        applications
            .into_iter()
            .map(|(application, internship)| {
                ApplicationResponse::new(application, internship.into())
            })
            .collect(),
    ))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthCheckResponse>> {
    // Check database connectivity
    state.user_service.health_check().await?;

    Ok(Json(HealthCheckResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: VERSION.to_string(),
    }))
}
