use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::{repository_error, AppState};
use crate::auth::AuthUser;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::models::{Profile, ProfileInput};

pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Option<Profile>>>, ApiError> {
    let profile = state
        .repository
        .get_profile(user.id)
        .await
        .map_err(|e| repository_error(e, "Profile not found"))?;

    Ok(Json(Envelope::new(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<ProfileInput>, JsonRejection>,
) -> Result<Json<Envelope<Profile>>, ApiError> {
    let Json(input) = payload?;
    let profile = input.validate()?;

    let saved = state
        .repository
        .upsert_profile(user.id, &profile)
        .await
        .map_err(|e| repository_error(e, "Profile not found"))?;

    tracing::debug!(user_id = %user.id, "profile saved");
    Ok(Json(Envelope::new(saved)))
}
