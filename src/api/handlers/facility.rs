use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::{QuoteQuery, SlotsQuery};
use crate::api::dtos::responses::{FacilityListItem, QuoteResponse, SlotView, SlotsResponse};
use crate::api::extractors::maybe_auth::MaybeAuthUser;
use crate::api::handlers::{manages, parse_date, parse_time};
use crate::domain::models::facility::{Facility, FacilityFilter, FacilityWithPhotos};
use crate::domain::services::availability::{generate_slots, mark_availability};
use crate::domain::services::reservation::{local_now, plan, ReservationRequest};
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::{debug, info};

async fn bookable_facility(state: &AppState, id: &str) -> Result<Facility, AppError> {
    state.facility_repo.find_by_id(id).await?
        .filter(|f| f.is_bookable())
        .ok_or(AppError::NotFound("Facility not found".into()))
}

pub async fn list_facilities(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<FacilityFilter>,
) -> Result<impl IntoResponse, AppError> {
    let facilities = state.facility_repo.list_bookable(&filter).await?;

    let mut items = Vec::new();
    for facility in facilities.into_iter().filter(|f| f.matches(&filter)) {
        let main_photo = state.photo_repo.list_by_facility(&facility.id).await?.into_iter().next();
        items.push(FacilityListItem { facility, main_photo });
    }

    debug!("Browse {:?} matched {} facilities", filter, items.len());
    Ok(Json(items))
}

pub async fn get_facility(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(actor): MaybeAuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let facility = state.facility_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Facility not found".into()))?;

    // Unpublished facilities stay visible to whoever manages them.
    let visible = facility.is_bookable() || actor.as_ref().is_some_and(|a| manages(a, &facility));
    if !visible {
        return Err(AppError::NotFound("Facility not found".into()));
    }

    let photos = state.photo_repo.list_by_facility(&facility.id).await?;
    Ok(Json(FacilityWithPhotos { facility, photos }))
}

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let facility = bookable_facility(&state, &id).await?;
    let sport = facility.sport_type(&query.sport)
        .ok_or_else(|| AppError::NotFound(format!("Sport type '{}' is not offered here", query.sport)))?;
    let date = parse_date(&query.date)?;

    let now = local_now(&facility, state.clock.now());
    let slots = if date < now.date() {
        Vec::new()
    } else {
        let generated = generate_slots(&sport.pricing, date, now);
        let active = state.booking_repo.list_active_for_day(&facility.id, &sport.name_en, date).await?;
        mark_availability(generated, &active)
            .into_iter()
            .map(|(slot, available)| SlotView { slot, available })
            .collect()
    };

    info!("Generated {} slots for {} / {} on {}", slots.len(), facility.id, sport.name_en, date);

    Ok(Json(SlotsResponse {
        facility_id: facility.id.clone(),
        sport_type: sport.name_en.clone(),
        date,
        currency: facility.currency.clone(),
        slots,
    }))
}

pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let facility = bookable_facility(&state, &id).await?;
    let date = parse_date(&query.date)?;
    let start = parse_time(&query.start)?;

    let sport_name = facility.sport_type(&query.sport)
        .map(|s| s.name_en.clone())
        .ok_or_else(|| AppError::NotFound(format!("Sport type '{}' is not offered here", query.sport)))?;
    let active = state.booking_repo.list_active_for_day(&facility.id, &sport_name, date).await?;

    let request = ReservationRequest {
        user_id: "",
        sport_type: &sport_name,
        date,
        start,
        duration_hours: query.duration.unwrap_or(1),
        number_of_players: query.players.unwrap_or(1),
    };
    let params = plan(&facility, &request, &active, state.clock.now())?;

    Ok(Json(QuoteResponse::from(params)))
}
