use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::{repository_error, AppState};
use crate::auth::{require_permission, AuthUser};
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::models::{Permission, Rally, RallyInput};

/// Requires the `create_rally` grant, checked before the body is validated.
pub async fn create_rally(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<RallyInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Rally>>), ApiError> {
    require_permission(state.repository.as_ref(), &user, Permission::CreateRally).await?;

    let Json(input) = payload?;
    let rally = input.validate()?;

    let row = state
        .repository
        .create_rally(user.id, &rally)
        .await
        .map_err(|e| repository_error(e, "Rally not found"))?;

    tracing::info!(user_id = %user.id, rally_id = %row.id, name = %row.fields.name, "rally created");
    Ok((StatusCode::CREATED, Json(Envelope::new(row))))
}

pub async fn get_rallies(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<Rally>>>, ApiError> {
    let rallies = state
        .repository
        .list_rallies()
        .await
        .map_err(|e| repository_error(e, "Rally not found"))?;

    Ok(Json(Envelope::new(rallies)))
}
