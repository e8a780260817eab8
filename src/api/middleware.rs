//! Authentication Middleware
//!
//! Verifies provider-issued bearer tokens before protected handlers run.

use crate::service::identity::{bearer_token, IdentityProvider};
use crate::utils::error::AppError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Extension type carrying the verified subject id in request extensions
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// Authentication middleware that verifies the bearer token and records the subject
///
/// A missing or malformed Authorization header yields 401; a token that fails
/// verification yields 403.
pub async fn auth_middleware(
    State(identity): State<Arc<dyn IdentityProvider>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let token = bearer_token(header)?;
    let subject = identity.verify(token).map_err(|e| {
        log::debug!("Rejected bearer token: {}", e);
        AppError::from(e)
    })?;

    request.extensions_mut().insert(AuthUser(subject));

    Ok(next.run(request).await)
}

/// Helper function to extract the authenticated subject from request extensions
///
/// The auth_middleware must be applied to the route for this to work.
pub fn extract_auth_user(request: &Request) -> Result<&str, AppError> {
    request
        .extensions()
        .get::<AuthUser>()
        .map(|auth_user| auth_user.0.as_str())
        .ok_or_else(|| AppError::Authentication("User context not found in request extensions".into()))
}
