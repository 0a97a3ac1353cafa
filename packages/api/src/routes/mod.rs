//! # HTTP surface — the rally functions
//!
//! [`router`] mounts every function under `/functions/v1` plus a public
//! `/health` probe. Each function route answers its own method and 405 for
//! anything else; `OPTIONS` is handled by the [`cors`] layer.
//!
//! | Route | Method | Auth | Success |
//! |-------|--------|------|---------|
//! | `/get-profile` | GET | bearer | 200, `data` may be `null` |
//! | `/update-profile` | POST | bearer | 200 |
//! | `/get-codrivers` | GET | bearer | 200 |
//! | `/add-codriver` | POST | bearer | 201 |
//! | `/update-codriver` | POST | bearer | 200, 404 when not owned |
//! | `/delete-codriver` | POST | bearer | 200 `{success, id}`, 404 when not owned |
//! | `/get-cars` | GET | bearer | 200 |
//! | `/add-car` | POST | bearer | 201 |
//! | `/update-car` | POST | bearer | 200, 404 when not owned |
//! | `/delete-car` | POST | bearer | 200 `{success, id}`, 404 when not owned |
//! | `/get-permissions` | GET | bearer | 200 |
//! | `/create-rally` | POST | bearer + `create_rally` | 201, 403 without the grant |
//! | `/get-rallies` | GET | public | 200 |
//!
//! Handlers take [`AuthUser`](crate::auth::AuthUser) before the JSON body, so
//! an unauthenticated request is rejected before its body is even parsed.

mod cars;
mod codrivers;
pub mod cors;
mod permissions;
mod profile;
mod rallies;

use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::SharedVerifier;
use crate::db::{Repository, RepositoryError};
use crate::error::ApiError;

/// Shared handles; nothing mutable lives here.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub verifier: SharedVerifier,
}

impl AppState {
    pub fn new(repository: Arc<dyn Repository>, verifier: SharedVerifier) -> Self {
        Self {
            repository,
            verifier,
        }
    }
}

impl FromRef<AppState> for SharedVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

pub fn router(state: AppState) -> Router {
    let functions = Router::new()
        .route("/get-profile", function(get(profile::get_profile)))
        .route("/update-profile", function(post(profile::update_profile)))
        .route("/get-codrivers", function(get(codrivers::get_codrivers)))
        .route("/add-codriver", function(post(codrivers::add_codriver)))
        .route("/update-codriver", function(post(codrivers::update_codriver)))
        .route("/delete-codriver", function(post(codrivers::delete_codriver)))
        .route("/get-cars", function(get(cars::get_cars)))
        .route("/add-car", function(post(cars::add_car)))
        .route("/update-car", function(post(cars::update_car)))
        .route("/delete-car", function(post(cars::delete_car)))
        .route("/get-permissions", function(get(permissions::get_permissions)))
        .route("/create-rally", function(post(rallies::create_rally)))
        .route("/get-rallies", function(get(rallies::get_rallies)));

    Router::new()
        .nest("/functions/v1", functions)
        .route("/health", get(health))
        .fallback(not_found)
        .layer(cors::layer())
        .with_state(state)
}

fn function(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(method_not_allowed)
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".into())
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Map a repository failure; `not_found` is the resource-specific 404 text.
fn repository_error(error: RepositoryError, not_found: &str) -> ApiError {
    match error {
        RepositoryError::NotFound => ApiError::NotFound(not_found.to_string()),
        RepositoryError::Database(e) => {
            tracing::error!(error = %e, "database operation failed");
            ApiError::internal("Internal server error")
        }
    }
}

#[cfg(test)]
mod tests;
