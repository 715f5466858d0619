use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::{AdminFacilitiesQuery, VerificationRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::facility::VerificationStatus;
use crate::domain::models::user::Actor;
use crate::error::AppError;
use crate::state::AppState;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

fn require_admin(actor: &Actor) -> Result<(), AppError> {
    if !actor.is_admin() {
        warn!("User {} attempted an admin action", actor.user_id);
        return Err(AppError::Forbidden("Admin only".into()));
    }
    Ok(())
}

pub async fn list_facilities_for_review(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Query(query): Query<AdminFacilitiesQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&actor)?;

    let status = query.status.as_deref()
        .filter(|s| !s.is_empty())
        .map(VerificationStatus::from_str)
        .transpose()
        .map_err(AppError::Validation)?;

    let facilities = state.facility_repo.list_by_status(status).await?;
    Ok(Json(facilities))
}

pub async fn set_verification(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<VerificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&actor)?;

    let updated = state.facility_repo
        .set_verification_status(&id, payload.status, state.clock.now())
        .await?;
    info!("Facility {} marked {} by admin {}", updated.id, updated.verification_status, actor.user_id);
    Ok(Json(updated))
}
