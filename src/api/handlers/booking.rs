use axum::{body::Bytes, extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::api::dtos::requests::{BookingScope, CreateBookingRequest, MyBookingsQuery, TransitionRequest};
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::{manages, parse_date, parse_time};
use crate::domain::models::booking::Booking;
use crate::domain::models::facility::Facility;
use crate::domain::models::user::Actor;
use crate::domain::services::lifecycle::{apply, BookingAction, Relation, TransitionContext};
use crate::domain::services::reservation::{local_now, plan, starts_at, ReservationRequest};
use crate::error::AppError;
use crate::state::AppState;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&payload.date)?;
    let start = parse_time(&payload.start_time)?;

    let facility = state.facility_repo.find_by_id(&payload.facility_id).await?
        .ok_or(AppError::NotFound("Facility not found".into()))?;
    let sport_name = facility.sport_type(&payload.sport_type)
        .map(|s| s.name_en.clone())
        .ok_or_else(|| AppError::NotFound(format!("Sport type '{}' is not offered here", payload.sport_type)))?;

    let active = state.booking_repo.list_active_for_day(&facility.id, &sport_name, date).await?;

    let now = state.clock.now();
    let request = ReservationRequest {
        user_id: &actor.user_id,
        sport_type: &sport_name,
        date,
        start,
        duration_hours: payload.duration_hours,
        number_of_players: payload.number_of_players,
    };
    let params = plan(&facility, &request, &active, now).inspect_err(|e| {
        warn!("Booking rejected for user {} at {} {} {}: {}", actor.user_id, facility.id, date, start, e);
    })?;

    let created = state.booking_repo.create(&Booking::new(params, now)).await?;
    info!("Booking {} created: {} {} {}-{} total {} {}",
        created.id, created.facility_id, created.booking_date, created.start_time, created.end_time,
        created.total_price, created.currency);

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Query(query): Query<MyBookingsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut bookings = state.booking_repo.list_by_user(&actor.user_id).await?;
    if query.scope == BookingScope::All {
        return Ok(Json(bookings));
    }

    // "Today" is per facility, in its own timezone.
    let now = state.clock.now();
    let mut today_at: HashMap<String, NaiveDate> = HashMap::new();
    for booking in &bookings {
        if today_at.contains_key(&booking.facility_id) {
            continue;
        }
        let today = match state.facility_repo.find_by_id(&booking.facility_id).await? {
            Some(facility) => local_now(&facility, now).date(),
            None => now.date_naive(),
        };
        today_at.insert(booking.facility_id.clone(), today);
    }
    let is_upcoming = |b: &Booking| {
        let today = today_at.get(&b.facility_id).copied().unwrap_or_else(|| now.date_naive());
        b.status.is_active() && b.booking_date >= today
    };

    if query.scope == BookingScope::Upcoming {
        bookings.retain(|b| is_upcoming(b));
        bookings.reverse();
    } else {
        bookings.retain(|b| !is_upcoming(b));
    }

    Ok(Json(bookings))
}

async fn load(state: &AppState, id: &str) -> Result<(Booking, Facility), AppError> {
    let booking = state.booking_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    let facility = state.facility_repo.find_by_id(&booking.facility_id).await?
        .ok_or_else(|| AppError::InternalWithMsg(format!("booking {} references missing facility {}", booking.id, booking.facility_id)))?;
    Ok((booking, facility))
}

fn relation(actor: &Actor, booking: &Booking, facility: &Facility) -> Relation {
    Relation {
        is_booker: booking.user_id == actor.user_id,
        is_facility_side: manages(actor, facility),
    }
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (booking, facility) = load(&state, &id).await?;
    let rel = relation(&actor, &booking, &facility);
    if !rel.is_booker && !rel.is_facility_side {
        return Err(AppError::Forbidden("Not your booking".into()));
    }
    Ok(Json(booking))
}

fn transition_body(body: &Bytes) -> Result<TransitionRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TransitionRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))
}

async fn run_transition(
    state: &AppState,
    actor: &Actor,
    id: &str,
    action: BookingAction,
    body: TransitionRequest,
) -> Result<Booking, AppError> {
    let (mut booking, facility) = load(state, id).await?;
    let rel = relation(actor, &booking, &facility);

    let from = booking.status;
    let ctx = TransitionContext {
        now: state.clock.now(),
        starts_at: starts_at(&facility, booking.booking_date, booking.start_time),
        policy: &facility.cancellation_policy,
        reason: body.reason.filter(|r| !r.trim().is_empty()),
    };
    apply(&mut booking, action, rel, ctx)?;

    let updated = state.booking_repo.update_status(&booking, from).await?;
    info!("Booking {} {} -> {} by {} (refund {:?})", updated.id, from, updated.status, actor.user_id, updated.refund_percentage);
    Ok(updated)
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let body = transition_body(&body)?;
    let updated = run_transition(&state, &actor, &id, BookingAction::CancelByUser, body).await?;
    Ok(Json(updated))
}

pub async fn facility_action(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path((id, action)): Path<(String, BookingAction)>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let body = transition_body(&body)?;
    let updated = run_transition(&state, &actor, &id, action, body).await?;
    Ok(Json(updated))
}
