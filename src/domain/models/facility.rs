use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::domain::models::sport::SportType;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VerificationStatus::Pending),
            "approved" => Ok(VerificationStatus::Approved),
            "rejected" => Ok(VerificationStatus::Rejected),
            other => Err(format!("unknown verification status '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CancellationPolicy {
    pub hours: u32,
    pub refund_percentage: u8,
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self { hours: 24, refund_percentage: 100 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub website: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BilingualItem {
    pub name_en: String,
    pub name_ar: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Facility {
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
    pub location: GeoPoint,
    pub currency: String,
    pub timezone: String,
    pub contact: ContactInfo,
    pub amenities: Vec<BilingualItem>,
    pub rules: Vec<BilingualItem>,
    pub cancellation_policy: CancellationPolicy,
    pub sport_types: Vec<SportType>,
    pub verification_status: VerificationStatus,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Facility {
    /// Only approved and active facilities accept bookings or show up publicly.
    pub fn is_bookable(&self) -> bool {
        self.verification_status == VerificationStatus::Approved && self.is_active
    }

    pub fn sport_type(&self, name: &str) -> Option<&SportType> {
        self.sport_types.iter().find(|s| s.is_named(name))
    }

    pub fn matches(&self, filter: &FacilityFilter) -> bool {
        if let Some(sport) = filter.sport.as_deref().filter(|s| !s.trim().is_empty())
            && self.sport_type(sport).is_none() {
            return false;
        }

        if let Some(term) = filter.query.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let term = term.to_lowercase();
            let haystack = [
                &self.name_en, &self.name_ar,
                &self.description_en, &self.description_ar,
                &self.address_en, &self.address_ar,
            ];
            if !haystack.iter().any(|field| field.to_lowercase().contains(&term)) {
                return false;
            }
        }

        true
    }
}

/// Public browse filter. `country` and `city` are applied by the store,
/// `sport` and `query` by [`Facility::matches`].
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FacilityFilter {
    pub country: Option<String>,
    pub city: Option<String>,
    pub sport: Option<String>,
    #[serde(rename = "q")]
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Photo {
    pub id: String,
    pub facility_id: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub is_main: bool,
    pub created_at: DateTime<Utc>,
}

/// A facility together with its photos, as returned by the detail endpoints.
#[derive(Debug, Serialize, Clone)]
pub struct FacilityWithPhotos {
    #[serde(flatten)]
    pub facility: Facility,
    pub photos: Vec<Photo>,
}
