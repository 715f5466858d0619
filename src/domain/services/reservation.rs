use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::domain::models::booking::{Booking, NewBookingParams};
use crate::domain::models::facility::Facility;
use crate::domain::services::availability::{find_slot, generate_slots};
use crate::domain::services::pricing::total_price;
use crate::error::AppError;

/// Facility timezone, falling back to UTC for unknown names.
pub fn facility_tz(facility: &Facility) -> Tz {
    facility.timezone.parse().unwrap_or_else(|_| {
        warn!("Facility {} has unknown timezone '{}', using UTC", facility.id, facility.timezone);
        chrono_tz::UTC
    })
}

/// Wall clock at the facility.
pub fn local_now(facility: &Facility, now: DateTime<Utc>) -> NaiveDateTime {
    now.with_timezone(&facility_tz(facility)).naive_local()
}

/// Absolute start instant of a local date and time at the facility.
///
/// Times skipped by a DST jump resolve to the instant right after the gap.
pub fn starts_at(facility: &Facility, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let tz = facility_tz(facility);
    let local = date.and_time(time);
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local)),
    }
}

pub struct ReservationRequest<'a> {
    pub user_id: &'a str,
    pub sport_type: &'a str,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub duration_hours: u32,
    pub number_of_players: u32,
}

/// Checks a booking request against the facility's generated slots and the
/// active bookings of that day, and prices it.
///
/// `active` must hold the bookings still occupying the court for the same
/// facility, sport and date.
pub fn plan(
    facility: &Facility,
    request: &ReservationRequest<'_>,
    active: &[Booking],
    now: DateTime<Utc>,
) -> Result<NewBookingParams, AppError> {
    if !facility.is_bookable() {
        return Err(AppError::NotFound("Facility not found".into()));
    }

    let sport = facility
        .sport_type(request.sport_type)
        .ok_or_else(|| AppError::NotFound(format!("Sport type '{}' is not offered here", request.sport_type)))?;

    if request.duration_hours < 1 {
        return Err(AppError::Validation("Duration must be at least one hour".into()));
    }
    if request.number_of_players < 1 {
        return Err(AppError::Validation("At least one player is required".into()));
    }
    if !sport.facility.allows_players(request.number_of_players) {
        return Err(AppError::Validation(format!(
            "This field takes at most {} players",
            sport.facility.max_capacity
        )));
    }

    let local = local_now(facility, now);
    if request.date < local.date() {
        return Err(AppError::Validation("Cannot book in the past".into()));
    }

    let slots = generate_slots(&sport.pricing, request.date, local);
    let slot = find_slot(&slots, request.start).ok_or_else(|| {
        debug!("No slot at {} on {} for {}", request.start, request.date, sport.name_en);
        AppError::Conflict("Selected time slot is not available".into())
    })?;

    let (end, wrapped) = request
        .start
        .overflowing_add_signed(Duration::hours(request.duration_hours as i64));
    if wrapped != 0 {
        return Err(AppError::Validation("Booking must end on the same day".into()));
    }

    if active.iter().any(|b| b.status.is_active() && b.overlaps(request.start, end)) {
        return Err(AppError::Conflict("Time slot is already booked".into()));
    }

    Ok(NewBookingParams {
        user_id: request.user_id.to_string(),
        facility_id: facility.id.clone(),
        sport_type: sport.name_en.clone(),
        booking_date: request.date,
        start_time: request.start,
        end_time: end,
        duration_hours: request.duration_hours,
        number_of_players: request.number_of_players,
        base_price: slot.price,
        total_price: total_price(slot, request.duration_hours),
        currency: facility.currency.clone(),
    })
}
