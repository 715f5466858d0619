pub mod auth;
pub mod booking;
pub mod facility;
pub mod pricing;
pub mod registration;
pub mod sport;
pub mod user;
