pub mod rows;

pub mod sqlite_booking_repo;
pub mod sqlite_facility_repo;
pub mod sqlite_photo_repo;

pub mod postgres_booking_repo;
pub mod postgres_facility_repo;
pub mod postgres_photo_repo;
