use std::sync::Arc;
use crate::domain::ports::{BookingRepository, Clock, FacilityRepository, PhotoRepository};
use crate::domain::services::registration::RegistrationLimits;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub facility_repo: Arc<dyn FacilityRepository>,
    pub photo_repo: Arc<dyn PhotoRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn registration_limits(&self) -> RegistrationLimits {
        RegistrationLimits { max_photo_bytes: self.config.max_photo_bytes }
    }
}
