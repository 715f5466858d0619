//! Storage shapes shared by the SQLite and Postgres repositories.
//!
//! Money is kept as TEXT so both backends round-trip `Decimal` exactly, and
//! court times as zero-padded `HH:MM` so they compare lexicographically.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;

use crate::domain::models::booking::{Booking, BookingStatus, PaymentStatus};
use crate::domain::models::facility::{
    BilingualItem, CancellationPolicy, ContactInfo, Facility, GeoPoint, VerificationStatus,
};
use crate::domain::models::pricing::{format_hhmm, parse_hhmm};
use crate::domain::models::sport::SportType;
use crate::error::AppError;

pub const ACTIVE_STATUSES: &str = "('pending', 'confirmed', 'checked_in')";

fn corrupt(what: &str, id: &str, detail: impl std::fmt::Display) -> AppError {
    AppError::InternalWithMsg(format!("corrupt {} row {}: {}", what, id, detail))
}

#[derive(Debug, FromRow)]
pub struct FacilityRow {
    pub id: String,
    pub owner_id: String,
    pub name_en: String,
    pub name_ar: String,
    pub description_en: String,
    pub description_ar: String,
    pub address_en: String,
    pub address_ar: String,
    pub country_code: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub currency: String,
    pub timezone: String,
    pub contact: Json<ContactInfo>,
    pub amenities: Json<Vec<BilingualItem>>,
    pub rules: Json<Vec<BilingualItem>>,
    pub cancellation_hours: i32,
    pub refund_percentage: i32,
    pub sport_types: Json<Vec<SportType>>,
    pub verification_status: String,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<FacilityRow> for Facility {
    type Error = AppError;

    fn try_from(row: FacilityRow) -> Result<Self, Self::Error> {
        let verification_status = VerificationStatus::from_str(&row.verification_status)
            .map_err(|e| corrupt("facility", &row.id, e))?;
        let hours = u32::try_from(row.cancellation_hours)
            .map_err(|e| corrupt("facility", &row.id, e))?;
        let refund_percentage = u8::try_from(row.refund_percentage)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| corrupt("facility", &row.id, "refund_percentage"))?;

        Ok(Facility {
            verification_status,
            owner_id: row.owner_id,
            name_en: row.name_en,
            name_ar: row.name_ar,
            description_en: row.description_en,
            description_ar: row.description_ar,
            address_en: row.address_en,
            address_ar: row.address_ar,
            country_code: row.country_code,
            city: row.city,
            location: GeoPoint { latitude: row.latitude, longitude: row.longitude },
            currency: row.currency,
            timezone: row.timezone,
            contact: row.contact.0,
            amenities: row.amenities.0,
            rules: row.rules.0,
            cancellation_policy: CancellationPolicy { hours, refund_percentage },
            sport_types: row.sport_types.0,
            is_active: row.is_active,
            is_featured: row.is_featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
            id: row.id,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct BookingRow {
    pub id: String,
    pub user_id: String,
    pub facility_id: String,
    pub sport_type: String,
    pub booking_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i32,
    pub number_of_players: i32,
    pub base_price: String,
    pub total_price: String,
    pub currency: String,
    pub status: String,
    pub payment_status: String,
    pub refund_percentage: Option<i32>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let id = row.id.as_str();
        let start_time = parse_hhmm(&row.start_time).ok_or_else(|| corrupt("booking", id, "start_time"))?;
        let end_time = parse_hhmm(&row.end_time).ok_or_else(|| corrupt("booking", id, "end_time"))?;
        let base_price = Decimal::from_str(&row.base_price).map_err(|e| corrupt("booking", id, e))?;
        let total_price = Decimal::from_str(&row.total_price).map_err(|e| corrupt("booking", id, e))?;
        let status = BookingStatus::from_str(&row.status).map_err(|e| corrupt("booking", id, e))?;
        let payment_status = PaymentStatus::from_str(&row.payment_status).map_err(|e| corrupt("booking", id, e))?;

        Ok(Booking {
            user_id: row.user_id,
            facility_id: row.facility_id,
            sport_type: row.sport_type,
            booking_date: row.booking_date,
            start_time,
            end_time,
            duration_minutes: row.duration_minutes,
            number_of_players: row.number_of_players,
            base_price,
            total_price,
            currency: row.currency,
            status,
            payment_status,
            refund_percentage: row.refund_percentage.map(|p| p.clamp(0, 100) as u8),
            cancellation_reason: row.cancellation_reason,
            cancelled_at: row.cancelled_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            id: row.id,
        })
    }
}

pub fn facilities_from_rows(rows: Vec<FacilityRow>) -> Result<Vec<Facility>, AppError> {
    rows.into_iter().map(Facility::try_from).collect()
}

pub fn bookings_from_rows(rows: Vec<BookingRow>) -> Result<Vec<Booking>, AppError> {
    rows.into_iter().map(Booking::try_from).collect()
}

/// Cancellation policy as stored in the two INTEGER columns.
pub struct PolicyColumns {
    pub hours: i32,
    pub refund_percentage: i32,
}

impl TryFrom<&CancellationPolicy> for PolicyColumns {
    type Error = AppError;

    fn try_from(policy: &CancellationPolicy) -> Result<Self, Self::Error> {
        let hours = i32::try_from(policy.hours)
            .map_err(|_| AppError::Validation(format!("Cancellation notice of {} hours is out of range", policy.hours)))?;
        Ok(Self { hours, refund_percentage: i32::from(policy.refund_percentage) })
    }
}

/// Column values of a booking in insert order, pre-formatted for storage.
pub struct BookingColumns {
    pub start_time: String,
    pub end_time: String,
    pub base_price: String,
    pub total_price: String,
    pub refund_percentage: Option<i32>,
}

impl From<&Booking> for BookingColumns {
    fn from(booking: &Booking) -> Self {
        Self {
            start_time: format_hhmm(booking.start_time),
            end_time: format_hhmm(booking.end_time),
            base_price: booking.base_price.to_string(),
            total_price: booking.total_price.to_string(),
            refund_percentage: booking.refund_percentage.map(i32::from),
        }
    }
}
