use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::domain::models::pricing::hhmm;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Completed,
    CancelledByUser,
    CancelledByFacility,
    Rejected,
    NoShow,
}

impl BookingStatus {
    pub const ACTIVE: [BookingStatus; 3] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::Completed => "completed",
            BookingStatus::CancelledByUser => "cancelled_by_user",
            BookingStatus::CancelledByFacility => "cancelled_by_facility",
            BookingStatus::Rejected => "rejected",
            BookingStatus::NoShow => "no_show",
        }
    }

    /// Holds the court: counts against availability.
    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed
                | BookingStatus::CancelledByUser
                | BookingStatus::CancelledByFacility
                | BookingStatus::Rejected
                | BookingStatus::NoShow
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "checked_in" => Ok(BookingStatus::CheckedIn),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled_by_user" => Ok(BookingStatus::CancelledByUser),
            "cancelled_by_facility" => Ok(BookingStatus::CancelledByFacility),
            "rejected" => Ok(BookingStatus::Rejected),
            "no_show" => Ok(BookingStatus::NoShow),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}

/// Starts `pending`; `completed` is written by the external payment processor.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub facility_id: String,
    pub sport_type: String,
    pub booking_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub number_of_players: i32,
    pub base_price: Decimal,
    pub total_price: Decimal,
    pub currency: String,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub refund_percentage: Option<u8>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewBookingParams {
    pub user_id: String,
    pub facility_id: String,
    pub sport_type: String,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_hours: u32,
    pub number_of_players: u32,
    pub base_price: Decimal,
    pub total_price: Decimal,
    pub currency: String,
}

impl Booking {
    pub fn new(params: NewBookingParams, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: params.user_id,
            facility_id: params.facility_id,
            sport_type: params.sport_type,
            booking_date: params.booking_date,
            start_time: params.start_time,
            end_time: params.end_time,
            duration_minutes: (params.duration_hours * 60) as i32,
            number_of_players: params.number_of_players as i32,
            base_price: params.base_price,
            total_price: params.total_price,
            currency: params.currency,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            refund_percentage: None,
            cancellation_reason: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Half-open `[start, end)` overlap on the same day.
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time < end && self.end_time > start
    }
}
