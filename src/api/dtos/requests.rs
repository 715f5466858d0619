use crate::domain::models::facility::VerificationStatus;
use crate::domain::models::sport::SportType;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub sport: String,
    pub date: String,
}

#[derive(Deserialize)]
pub struct QuoteQuery {
    pub sport: String,
    pub date: String,
    pub start: String,
    pub duration: Option<u32>,
    pub players: Option<u32>,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub facility_id: String,
    pub sport_type: String,
    pub date: String,
    pub start_time: String,
    #[serde(default = "default_duration")]
    pub duration_hours: u32,
    #[serde(default = "default_players")]
    pub number_of_players: u32,
}

fn default_duration() -> u32 { 1 }
fn default_players() -> u32 { 1 }

#[derive(Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingScope {
    Upcoming,
    Past,
    #[default]
    All,
}

#[derive(Deserialize)]
pub struct MyBookingsQuery {
    #[serde(default)]
    pub scope: BookingScope,
}

/// Optional body of every status transition.
#[derive(Deserialize, Default)]
pub struct TransitionRequest {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct OwnerBookingsQuery {
    pub status: Option<String>,
    pub facility_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateSportTypesRequest {
    pub sport_types: Vec<SportType>,
}

#[derive(Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Deserialize)]
pub struct AdminFacilitiesQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct VerificationRequest {
    pub status: VerificationStatus,
}
