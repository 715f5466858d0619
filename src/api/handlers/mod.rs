pub mod admin;
pub mod booking;
pub mod facility;
pub mod health;
pub mod owner;
pub mod registration;

use chrono::{NaiveDate, NaiveTime};
use crate::domain::models::facility::Facility;
use crate::domain::models::pricing::parse_hhmm;
use crate::domain::models::user::Actor;
use crate::error::AppError;

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))
}

pub(crate) fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    parse_hhmm(value).ok_or(AppError::Validation("Invalid time format (HH:MM)".into()))
}

/// Facility owner or admin.
pub(crate) fn manages(actor: &Actor, facility: &Facility) -> bool {
    actor.is_admin() || facility.owner_id == actor.user_id
}
