use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::domain::models::facility::{
    CancellationPolicy, ContactInfo, Facility, GeoPoint, Photo, VerificationStatus,
};
use crate::domain::models::pricing::TimeWindow;
use crate::domain::models::registration::{AssembledFacility, BasicInfo, PhotoUpload, ProfileEdit, RegistrationPayload};
use crate::domain::models::sport::SportType;
use crate::error::FieldErrors;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-()]+$").expect("phone pattern"));

pub const ALLOWED_PHOTO_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];
pub const DEFAULT_MAX_PHOTO_BYTES: i64 = 5 * 1024 * 1024;
/// One year.
pub const MAX_NOTICE_HOURS: u32 = 8760;

const REQUIRED: &str = "This field is required";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Basic,
    Details,
    Media,
}

#[derive(Debug, Clone, Copy)]
pub struct RegistrationLimits {
    pub max_photo_bytes: i64,
}

impl Default for RegistrationLimits {
    fn default() -> Self {
        Self { max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES }
    }
}

pub fn validate_step(step: WizardStep, payload: &RegistrationPayload, limits: &RegistrationLimits) -> FieldErrors {
    match step {
        WizardStep::Basic => validate_basic_info(&payload.basic_info),
        WizardStep::Details => {
            let mut errors = validate_sport_types(&payload.sport_types);
            errors.extend(validate_cancellation_policy(&payload.cancellation_policy));
            errors
        }
        WizardStep::Media => validate_media(&payload.photos, payload.main_photo_index, limits),
    }
}

pub fn validate_basic_info(info: &BasicInfo) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let required = [
        ("facility_name_en", &info.facility_name_en),
        ("facility_name_ar", &info.facility_name_ar),
        ("facility_description_en", &info.facility_description_en),
        ("facility_description_ar", &info.facility_description_ar),
        ("country_code", &info.country_code),
        ("city", &info.city),
        ("address_en", &info.address_en),
        ("address_ar", &info.address_ar),
        ("currency", &info.currency),
        ("phone", &info.phone),
        ("email", &info.email),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.insert(field.to_string(), REQUIRED.to_string());
        }
    }

    let email = info.email.trim();
    if !email.is_empty() && !EMAIL_RE.is_match(email) {
        errors.insert("email".into(), "Please enter a valid email address".into());
    }

    let phone = info.phone.trim();
    if !phone.is_empty() && !PHONE_RE.is_match(phone) {
        errors.insert("phone".into(), "Please enter a valid phone number".into());
    }

    let currency = info.currency.trim();
    if !currency.is_empty() && !(currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic())) {
        errors.insert("currency".into(), "Currency must be a 3-letter ISO code".into());
    }

    if let Some(tz) = info.timezone.as_deref().filter(|tz| !tz.trim().is_empty())
        && tz.trim().parse::<Tz>().is_err() {
        errors.insert("timezone".into(), "Unknown timezone".into());
    }

    if info.latitude.is_some_and(|lat| !(-90.0..=90.0).contains(&lat)) {
        errors.insert("latitude".into(), "Latitude must be between -90 and 90".into());
    }
    if info.longitude.is_some_and(|lng| !(-180.0..=180.0).contains(&lng)) {
        errors.insert("longitude".into(), "Longitude must be between -180 and 180".into());
    }

    errors
}

pub fn validate_sport_types(sport_types: &[SportType]) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if sport_types.is_empty() {
        errors.insert("sport_types".into(), "At least one sport type is required".into());
        return errors;
    }

    for (index, sport) in sport_types.iter().enumerate() {
        let name_en = sport.name_en.trim();
        let name_ar = sport.name_ar.trim();
        if name_en.is_empty() {
            errors.insert(format!("sport_{}_name_en", index), "Sport name in English is required".into());
        }
        if name_ar.is_empty() {
            errors.insert(format!("sport_{}_name_ar", index), "Sport name in Arabic is required".into());
        }

        // Lookups resolve to the first sport with a matching name.
        let earlier = &sport_types[..index];
        if !name_en.is_empty() && earlier.iter().any(|s| s.name_en.trim().eq_ignore_ascii_case(name_en)) {
            errors.insert(format!("sport_{}_name_en", index), "Sport type is already listed".into());
        }
        if !name_ar.is_empty() && earlier.iter().any(|s| s.name_ar.trim() == name_ar) {
            errors.insert(format!("sport_{}_name_ar", index), "Sport type is already listed".into());
        }

        for (day, pricing) in sport.pricing.configured_days() {
            let prefix = format!("sport_{}_{}", index, day);
            validate_day_windows(&prefix, &pricing.time_slots, &mut errors);
        }
    }

    errors
}

fn validate_day_windows(prefix: &str, windows: &[TimeWindow], errors: &mut FieldErrors) {
    let mut parsed = Vec::with_capacity(windows.len());

    for (slot_index, window) in windows.iter().enumerate() {
        if window.price.is_zero() {
            errors.insert(format!("{}_{}_price", prefix, slot_index), "Price is required".into());
        } else if window.price < Decimal::ZERO {
            errors.insert(format!("{}_{}_price", prefix, slot_index), "Price must be greater than zero".into());
        }

        let time_key = format!("{}_{}_time", prefix, slot_index);
        if window.start.trim().is_empty() || window.end.trim().is_empty() {
            errors.insert(time_key, "Time slot is required".into());
            continue;
        }
        match window.bounds() {
            None => {
                errors.insert(time_key, "Times must use the HH:MM format".into());
            }
            Some((start, end)) if end <= start => {
                errors.insert(time_key, "End time must be after start time".into());
            }
            Some(bounds) => parsed.push(bounds),
        }
    }

    parsed.sort();
    if parsed.windows(2).any(|pair| pair[1].0 < pair[0].1) {
        errors.insert(format!("{}_overlap", prefix), "Time slots must not overlap".into());
    }
}

pub fn validate_cancellation_policy(policy: &CancellationPolicy) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if policy.refund_percentage > 100 {
        errors.insert("cancellation_policy.refund_percentage".into(), "Refund percentage must be between 0 and 100".into());
    }
    if policy.hours > MAX_NOTICE_HOURS {
        errors.insert("cancellation_policy.hours".into(), format!("Notice period cannot exceed {} hours", MAX_NOTICE_HOURS));
    }
    errors
}

pub fn validate_media(photos: &[PhotoUpload], main_photo_index: Option<usize>, limits: &RegistrationLimits) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if photos.is_empty() {
        errors.insert("photos".into(), "At least one photo is required".into());
        return errors;
    }

    for (index, photo) in photos.iter().enumerate() {
        if photo.size_bytes > limits.max_photo_bytes {
            errors.insert(format!("photo_{}_size", index), format!("Image size must not exceed {}", readable_size(limits.max_photo_bytes)));
        }
        if !ALLOWED_PHOTO_TYPES.contains(&photo.content_type.as_str()) {
            errors.insert(format!("photo_{}", index), "Only JPG, PNG and WebP images are allowed".into());
        }
        if photo.url.trim().is_empty() {
            errors.insert(format!("photo_{}_url", index), REQUIRED.into());
        }
    }

    if main_photo_index.is_some_and(|i| i >= photos.len()) {
        errors.insert("main_photo_index".into(), "Main photo must be one of the uploaded photos".into());
    }

    errors
}

fn readable_size(bytes: i64) -> String {
    const MIB: i64 = 1024 * 1024;
    const KIB: i64 = 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}

fn apply_basic_info(facility: &mut Facility, info: BasicInfo) {
    facility.name_en = info.facility_name_en.trim().to_string();
    facility.name_ar = info.facility_name_ar.trim().to_string();
    facility.description_en = info.facility_description_en.trim().to_string();
    facility.description_ar = info.facility_description_ar.trim().to_string();
    facility.address_en = info.address_en.trim().to_string();
    facility.address_ar = info.address_ar.trim().to_string();
    facility.country_code = info.country_code.trim().to_uppercase();
    facility.city = info.city.trim().to_string();
    facility.location = GeoPoint {
        latitude: info.latitude.unwrap_or_default(),
        longitude: info.longitude.unwrap_or_default(),
    };
    facility.currency = info.currency.trim().to_uppercase();
    facility.timezone = info.timezone
        .map(|tz| tz.trim().to_string())
        .filter(|tz| !tz.is_empty())
        .unwrap_or_else(|| "UTC".to_string());
    facility.contact = ContactInfo {
        phone: info.phone.trim().to_string(),
        email: info.email.trim().to_string(),
        website: info.website.filter(|w| !w.trim().is_empty()),
    };
}

/// Applies an owner's profile edit after re-running the basic-info and policy gates.
///
/// Verification status, sport types and photos are left untouched.
pub fn edit_profile(facility: &mut Facility, edit: ProfileEdit, now: DateTime<Utc>) -> Result<(), FieldErrors> {
    let mut errors = validate_basic_info(&edit.basic_info);
    errors.extend(validate_cancellation_policy(&edit.cancellation_policy));
    if !errors.is_empty() {
        return Err(errors);
    }

    apply_basic_info(facility, edit.basic_info);
    facility.amenities = edit.amenities;
    facility.rules = edit.rules;
    facility.cancellation_policy = edit.cancellation_policy;
    facility.updated_at = now;
    Ok(())
}

/// Runs every wizard gate and, when all pass, builds the pending facility record.
///
/// The result is never `approved`; only admin moderation can publish it.
pub fn assemble(
    owner_id: &str,
    payload: RegistrationPayload,
    limits: &RegistrationLimits,
    now: DateTime<Utc>,
) -> Result<AssembledFacility, FieldErrors> {
    let mut errors = validate_basic_info(&payload.basic_info);
    errors.extend(validate_sport_types(&payload.sport_types));
    errors.extend(validate_cancellation_policy(&payload.cancellation_policy));
    errors.extend(validate_media(&payload.photos, payload.main_photo_index, limits));
    if !errors.is_empty() {
        return Err(errors);
    }

    let RegistrationPayload {
        basic_info: info,
        sport_types,
        amenities,
        rules,
        cancellation_policy,
        photos,
        main_photo_index,
    } = payload;

    let mut facility = Facility {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        amenities,
        rules,
        cancellation_policy,
        sport_types,
        verification_status: VerificationStatus::Pending,
        is_active: true,
        is_featured: false,
        created_at: now,
        updated_at: now,
        ..Default::default()
    };
    apply_basic_info(&mut facility, info);

    let main_index = main_photo_index.unwrap_or(0);
    let photos = photos
        .into_iter()
        .enumerate()
        .map(|(index, upload)| Photo {
            id: Uuid::new_v4().to_string(),
            facility_id: facility.id.clone(),
            url: upload.url,
            content_type: upload.content_type,
            size_bytes: upload.size_bytes,
            is_main: index == main_index,
            created_at: now,
        })
        .collect();

    Ok(AssembledFacility { facility, photos })
}
