use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::{repository_error, AppState};
use crate::auth::AuthUser;
use crate::envelope::{Deleted, Envelope};
use crate::error::ApiError;
use crate::models::{Car, CarInput, IdInput};

const NOT_FOUND: &str = "Car not found or access denied";

pub async fn get_cars(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Vec<Car>>>, ApiError> {
    let cars = state
        .repository
        .list_cars(user.id)
        .await
        .map_err(|e| repository_error(e, NOT_FOUND))?;

    Ok(Json(Envelope::new(cars)))
}

pub async fn add_car(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CarInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Car>>), ApiError> {
    let Json(input) = payload?;
    let car = input.validate()?;

    let row = state
        .repository
        .add_car(user.id, &car)
        .await
        .map_err(|e| repository_error(e, NOT_FOUND))?;

    tracing::debug!(user_id = %user.id, car_id = %row.id, "car added");
    Ok((StatusCode::CREATED, Json(Envelope::new(row))))
}

pub async fn update_car(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CarInput>, JsonRejection>,
) -> Result<Json<Envelope<Car>>, ApiError> {
    let Json(input) = payload?;
    let (id, car) = input.validate_update()?;

    let row = state
        .repository
        .update_car(user.id, id, &car)
        .await
        .map_err(|e| repository_error(e, NOT_FOUND))?;

    Ok(Json(Envelope::new(row)))
}

pub async fn delete_car(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<IdInput>, JsonRejection>,
) -> Result<Json<Envelope<Deleted>>, ApiError> {
    let Json(input) = payload?;
    let id = input.validate()?;

    state
        .repository
        .delete_car(user.id, id)
        .await
        .map_err(|e| repository_error(e, NOT_FOUND))?;

    tracing::debug!(user_id = %user.id, car_id = %id, "car deleted");
    Ok(Json(Envelope::new(Deleted::new(id))))
}
