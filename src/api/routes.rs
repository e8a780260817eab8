//! API Route Definitions
//!
//! This module defines all HTTP routes and their corresponding handlers using a
//! builder pattern. The RouterBuilder enables whole route groups, so a
//! read-only deployment can expose only the public browse endpoints.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use super::handlers::*;
use super::middleware::auth_middleware;

/// Builder for creating API routes with configurable route groups
///
/// Public routes (health, browse) are served as-is. Every other group sits
/// behind the bearer-token middleware.
#[derive(Default)]
pub struct RouterBuilder {
    /// GET /health
    health_check: bool,
    /// GET /api/internships, GET /api/internships/{id}
    browse: bool,
    /// POST /api/users, GET/PUT /api/me/profile
    accounts: bool,
    /// POST /api/internships, PUT/DELETE /api/internships/{id}, GET /api/company/internships
    postings: bool,
    /// GET /api/me/saved, POST/DELETE /api/internships/{id}/save
    bookmarks: bool,
    /// POST /api/internships/{id}/apply, GET /api/me/applications
    applications: bool,
}

impl RouterBuilder {
    /// Creates a new router builder with all route groups disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router builder with every route group enabled
    pub fn with_all_routes() -> Self {
        Self {
            health_check: true,
            browse: true,
            accounts: true,
            postings: true,
            bookmarks: true,
            applications: true,
        }
    }

    /// Creates a router builder with only the public, read-only routes
    ///
    /// Suitable for a public listing mirror that never sees credentials.
    pub fn with_readonly_routes() -> Self {
        Self {
            health_check: true,
            browse: true,
            ..Self::default()
        }
    }

    /// Creates a router with only the health check endpoint
    pub fn with_minimal_routes() -> Self {
        Self {
            health_check: true,
            ..Self::default()
        }
    }

    /// Enables or disables the health check endpoint (GET /health)
    pub fn health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    /// Enables or disables public internship browsing
    pub fn browse(mut self, enabled: bool) -> Self {
        self.browse = enabled;
        self
    }

    /// Enables or disables registration and own-profile endpoints
    pub fn accounts(mut self, enabled: bool) -> Self {
        self.accounts = enabled;
        self
    }

    /// Enables or disables company posting management
    pub fn postings(mut self, enabled: bool) -> Self {
        self.postings = enabled;
        self
    }

    /// Enables or disables saved internship endpoints
    pub fn bookmarks(mut self, enabled: bool) -> Self {
        self.bookmarks = enabled;
        self
    }

    /// Enables or disables application endpoints
    pub fn applications(mut self, enabled: bool) -> Self {
        self.applications = enabled;
        self
    }

    fn has_protected_routes(&self) -> bool {
        self.accounts || self.postings || self.bookmarks || self.applications
    }

    /// Builds the Axum router with the configured routes and the given state
    pub fn build(self, state: AppState) -> Router {
        let mut public = Router::new();

        if self.health_check {
            public = public.route("/health", get(health_check));
        }

        if self.browse {
            public = public
                .route("/api/internships", get(list_internships))
                .route("/api/internships/{id}", get(get_internship));
        }

        let mut protected = Router::new();

        if self.accounts {
            protected = protected
                .route("/api/users", post(create_user))
                .route("/api/me/profile", get(get_profile).put(update_profile));
        }

        if self.postings {
            protected = protected
                .route("/api/internships", post(create_internship))
                .route(
                    "/api/internships/{id}",
                    put(update_internship).delete(delete_internship),
                )
                .route("/api/company/internships", get(list_company_internships));
        }

        if self.bookmarks {
            protected = protected
                .route("/api/me/saved", get(list_saved))
                .route(
                    "/api/internships/{id}/save",
                    post(save_internship).delete(unsave_internship),
                );
        }

        if self.applications {
            protected = protected
                .route("/api/internships/{id}/apply", post(apply))
                .route("/api/me/applications", get(list_applications));
        }

        // route_layer panics on a router without routes
        if self.has_protected_routes() {
            public = public.merge(protected.route_layer(from_fn_with_state(
                state.identity.clone(),
                auth_middleware,
            )));
        }

        public.with_state(state)
    }
}

/// Creates a router with every endpoint enabled
pub fn create_routes(state: AppState) -> Router {
    RouterBuilder::with_all_routes().build(state)
}

/// Creates a router with only health and public browsing
pub fn create_readonly_routes(state: AppState) -> Router {
    RouterBuilder::with_readonly_routes().build(state)
}
