use axum::extract::State;
use axum::Json;

use super::{repository_error, AppState};
use crate::auth::AuthUser;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::models::PermissionGrant;

/// The caller's grants, sorted by permission name.
pub async fn get_permissions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Vec<PermissionGrant>>>, ApiError> {
    let grants = state
        .repository
        .list_permissions(user.id)
        .await
        .map_err(|e| repository_error(e, "Permissions not found"))?;

    Ok(Json(Envelope::new(grants)))
}
