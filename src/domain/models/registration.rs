use serde::{Deserialize, Serialize};

use crate::domain::models::facility::{BilingualItem, CancellationPolicy, Facility, Photo};
use crate::domain::models::sport::SportType;

/// Step one of the partner wizard.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BasicInfo {
    pub facility_name_en: String,
    pub facility_name_ar: String,
    pub facility_description_en: String,
    pub facility_description_ar: String,
    pub address_en: String,
    pub address_ar: String,
    pub country_code: String,
    pub city: String,
    pub currency: String,
    pub phone: String,
    pub email: String,
    pub website: Option<String>,
    pub timezone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Metadata of an image already handed to the upload collaborator.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PhotoUpload {
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RegistrationPayload {
    pub basic_info: BasicInfo,
    pub sport_types: Vec<SportType>,
    pub amenities: Vec<BilingualItem>,
    pub rules: Vec<BilingualItem>,
    pub cancellation_policy: CancellationPolicy,
    pub photos: Vec<PhotoUpload>,
    pub main_photo_index: Option<usize>,
}

/// Owner edit of everything registered outside sport types and photos.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProfileEdit {
    pub basic_info: BasicInfo,
    #[serde(default)]
    pub amenities: Vec<BilingualItem>,
    #[serde(default)]
    pub rules: Vec<BilingualItem>,
    pub cancellation_policy: CancellationPolicy,
}

/// Output of the assembler: the facility record plus the photo rows to insert after it.
#[derive(Debug, Clone)]
pub struct AssembledFacility {
    pub facility: Facility,
    pub photos: Vec<Photo>,
}
