use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::{repository_error, AppState};
use crate::auth::AuthUser;
use crate::envelope::{Deleted, Envelope};
use crate::error::ApiError;
use crate::models::{Codriver, CodriverInput, IdInput};

const NOT_FOUND: &str = "Codriver not found or access denied";

pub async fn get_codrivers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Vec<Codriver>>>, ApiError> {
    let codrivers = state
        .repository
        .list_codrivers(user.id)
        .await
        .map_err(|e| repository_error(e, NOT_FOUND))?;

    Ok(Json(Envelope::new(codrivers)))
}

pub async fn add_codriver(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CodriverInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Codriver>>), ApiError> {
    let Json(input) = payload?;
    let codriver = input.validate()?;

    let row = state
        .repository
        .add_codriver(user.id, &codriver)
        .await
        .map_err(|e| repository_error(e, NOT_FOUND))?;

    tracing::debug!(user_id = %user.id, codriver_id = %row.id, "codriver added");
    Ok((StatusCode::CREATED, Json(Envelope::new(row))))
}

pub async fn update_codriver(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CodriverInput>, JsonRejection>,
) -> Result<Json<Envelope<Codriver>>, ApiError> {
    let Json(input) = payload?;
    let (id, codriver) = input.validate_update()?;

    let row = state
        .repository
        .update_codriver(user.id, id, &codriver)
        .await
        .map_err(|e| repository_error(e, NOT_FOUND))?;

    Ok(Json(Envelope::new(row)))
}

pub async fn delete_codriver(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<IdInput>, JsonRejection>,
) -> Result<Json<Envelope<Deleted>>, ApiError> {
    let Json(input) = payload?;
    let id = input.validate()?;

    state
        .repository
        .delete_codriver(user.id, id)
        .await
        .map_err(|e| repository_error(e, NOT_FOUND))?;

    tracing::debug!(user_id = %user.id, codriver_id = %id, "codriver deleted");
    Ok(Json(Envelope::new(Deleted::new(id))))
}
