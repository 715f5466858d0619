use crate::domain::models::{
    booking::{Booking, BookingStatus},
    facility::{Facility, FacilityFilter, Photo, VerificationStatus},
    sport::SportType,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait FacilityRepository: Send + Sync {
    /// Inserts the facility and its photos in one transaction.
    async fn create(&self, facility: &Facility, photos: &[Photo]) -> Result<Facility, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Facility>, AppError>;
    /// Approved + active facilities narrowed by country/city, featured first.
    async fn list_bookable(&self, filter: &FacilityFilter) -> Result<Vec<Facility>, AppError>;
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Facility>, AppError>;
    async fn list_by_status(&self, status: Option<VerificationStatus>) -> Result<Vec<Facility>, AppError>;
    /// Writes the profile columns: names, descriptions, address, location, currency,
    /// timezone, contact, amenities, rules and cancellation policy.
    async fn update_profile(&self, facility: &Facility) -> Result<Facility, AppError>;
    async fn update_sport_types(&self, id: &str, sport_types: &[SportType], updated_at: DateTime<Utc>) -> Result<Facility, AppError>;
    async fn set_active(&self, id: &str, is_active: bool, updated_at: DateTime<Utc>) -> Result<Facility, AppError>;
    async fn set_verification_status(&self, id: &str, status: VerificationStatus, updated_at: DateTime<Utc>) -> Result<Facility, AppError>;
}

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Main photo first, then by creation time.
    async fn list_by_facility(&self, facility_id: &str) -> Result<Vec<Photo>, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts unless an active booking already overlaps the same court and day,
    /// in which case `AppError::Conflict` is returned.
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_for_owner(&self, owner_id: &str, status: Option<BookingStatus>, facility_id: Option<&str>) -> Result<Vec<Booking>, AppError>;
    /// Bookings still holding the court (pending, confirmed, checked in) for one sport on one day.
    async fn list_active_for_day(&self, facility_id: &str, sport_type: &str, date: NaiveDate) -> Result<Vec<Booking>, AppError>;
    /// Persists status, payment status and cancellation fields, provided the stored
    /// status is still `from`. Returns `AppError::Conflict` otherwise.
    async fn update_status(&self, booking: &Booking, from: BookingStatus) -> Result<Booking, AppError>;
}

/// Source of "now" for availability and cancellation decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
