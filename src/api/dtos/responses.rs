use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::models::booking::NewBookingParams;
use crate::domain::models::facility::{Facility, Photo};
use crate::domain::models::pricing::{hhmm, Slot};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct FacilityListItem {
    #[serde(flatten)]
    pub facility: Facility,
    pub main_photo: Option<Photo>,
}

#[derive(Serialize)]
pub struct SlotView {
    #[serde(flatten)]
    pub slot: Slot,
    pub available: bool,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub facility_id: String,
    pub sport_type: String,
    pub date: NaiveDate,
    pub currency: String,
    pub slots: Vec<SlotView>,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub sport_type: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub duration_hours: u32,
    pub base_price: Decimal,
    pub total_price: Decimal,
    pub currency: String,
}

impl From<NewBookingParams> for QuoteResponse {
    fn from(params: NewBookingParams) -> Self {
        Self {
            sport_type: params.sport_type,
            date: params.booking_date,
            start_time: params.start_time,
            end_time: params.end_time,
            duration_hours: params.duration_hours,
            base_price: params.base_price,
            total_price: params.total_price,
            currency: params.currency,
        }
    }
}

#[derive(Serialize)]
pub struct StepValidResponse {
    pub valid: bool,
}
