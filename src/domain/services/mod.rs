pub mod availability;
pub mod lifecycle;
pub mod pricing;
pub mod registration;
pub mod reservation;
