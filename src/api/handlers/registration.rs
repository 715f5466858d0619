use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::api::dtos::responses::StepValidResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::facility::FacilityWithPhotos;
use crate::domain::models::registration::RegistrationPayload;
use crate::domain::services::registration::{assemble, validate_step, WizardStep};
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::{debug, info};

pub async fn validate_registration_step(
    State(state): State<Arc<AppState>>,
    AuthUser(_actor): AuthUser,
    Path(step): Path<WizardStep>,
    Json(payload): Json<RegistrationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let errors = validate_step(step, &payload, &state.registration_limits());
    if !errors.is_empty() {
        debug!("Wizard step {:?} failed on {:?}", step, errors.keys().collect::<Vec<_>>());
        return Err(AppError::InvalidFields(errors));
    }
    Ok(Json(StepValidResponse { valid: true }))
}

pub async fn register_facility(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<RegistrationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let assembled = assemble(&actor.user_id, payload, &state.registration_limits(), state.clock.now())
        .map_err(AppError::InvalidFields)?;

    let facility = state.facility_repo.create(&assembled.facility, &assembled.photos).await?;
    let photos = state.photo_repo.list_by_facility(&facility.id).await?;

    info!("Facility {} registered by {} with {} photos, awaiting review", facility.id, actor.user_id, photos.len());
    Ok((StatusCode::CREATED, Json(FacilityWithPhotos { facility, photos })))
}
