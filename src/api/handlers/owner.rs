use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::{OwnerBookingsQuery, SetActiveRequest, UpdateSportTypesRequest};
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::manages;
use crate::domain::models::booking::BookingStatus;
use crate::domain::models::facility::Facility;
use crate::domain::models::registration::ProfileEdit;
use crate::domain::models::user::Actor;
use crate::domain::services::registration::{edit_profile, validate_sport_types};
use crate::error::AppError;
use crate::state::AppState;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

pub async fn list_owner_facilities(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let facilities = state.facility_repo.list_by_owner(&actor.user_id).await?;
    Ok(Json(facilities))
}

pub async fn list_owner_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Query(query): Query<OwnerBookingsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = query.status.as_deref()
        .filter(|s| !s.is_empty())
        .map(BookingStatus::from_str)
        .transpose()
        .map_err(AppError::Validation)?;
    let facility_id = query.facility_id.as_deref().filter(|s| !s.is_empty());

    let bookings = state.booking_repo.list_for_owner(&actor.user_id, status, facility_id).await?;
    Ok(Json(bookings))
}

async fn managed_facility(state: &AppState, actor: &Actor, id: &str) -> Result<Facility, AppError> {
    let facility = state.facility_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Facility not found".into()))?;
    if !manages(actor, &facility) {
        return Err(AppError::Forbidden("Not your facility".into()));
    }
    Ok(facility)
}

pub async fn update_facility(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<ProfileEdit>,
) -> Result<impl IntoResponse, AppError> {
    let mut facility = managed_facility(&state, &actor, &id).await?;

    edit_profile(&mut facility, payload, state.clock.now()).map_err(AppError::InvalidFields)?;

    let updated = state.facility_repo.update_profile(&facility).await?;
    info!("Facility {} profile edited by {}", updated.id, actor.user_id);
    Ok(Json(updated))
}

pub async fn update_sport_types(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSportTypesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let facility = managed_facility(&state, &actor, &id).await?;

    let errors = validate_sport_types(&payload.sport_types);
    if !errors.is_empty() {
        return Err(AppError::InvalidFields(errors));
    }

    let updated = state.facility_repo
        .update_sport_types(&facility.id, &payload.sport_types, state.clock.now())
        .await?;
    info!("Facility {} sport types replaced by {} ({} sports)", updated.id, actor.user_id, updated.sport_types.len());
    Ok(Json(updated))
}

pub async fn set_facility_active(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let facility = managed_facility(&state, &actor, &id).await?;
    let updated = state.facility_repo
        .set_active(&facility.id, payload.is_active, state.clock.now())
        .await?;
    info!("Facility {} is_active={} set by {}", updated.id, updated.is_active, actor.user_id);
    Ok(Json(updated))
}
