use serde::{Deserialize, Serialize};
use crate::domain::models::pricing::PricingSchedule;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    #[serde(rename = "")]
    Unspecified,
    Indoor,
    Outdoor,
    Other,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub length: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Equipment {
    pub name_en: String,
    pub name_ar: String,
    pub quantity: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SportFacilityDetails {
    pub field_type: FieldType,
    pub custom_field_type_en: Option<String>,
    pub custom_field_type_ar: Option<String>,
    pub surface_type_en: String,
    pub surface_type_ar: String,
    pub custom_surface_type_en: Option<String>,
    pub custom_surface_type_ar: Option<String>,
    pub dimensions: Dimensions,
    /// 0 means the owner did not set a limit.
    pub max_capacity: u32,
    pub equipment: Vec<Equipment>,
}

impl SportFacilityDetails {
    /// English field type label; the free-text override wins for `Other`.
    pub fn field_type_en(&self) -> &str {
        match self.field_type {
            FieldType::Indoor => "indoor",
            FieldType::Outdoor => "outdoor",
            FieldType::Other => self.custom_field_type_en.as_deref().unwrap_or("other"),
            FieldType::Unspecified => "",
        }
    }

    pub fn allows_players(&self, players: u32) -> bool {
        self.max_capacity == 0 || players <= self.max_capacity
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SportType {
    pub name_en: String,
    pub name_ar: String,
    #[serde(default)]
    pub pricing: PricingSchedule,
    #[serde(default)]
    pub facility: SportFacilityDetails,
}

impl SportType {
    /// Bookings reference a sport by its English name; Arabic is accepted too.
    pub fn is_named(&self, name: &str) -> bool {
        let name = name.trim();
        self.name_en.eq_ignore_ascii_case(name) || self.name_ar == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_other_uses_custom_label() {
        let details = SportFacilityDetails {
            field_type: FieldType::Other,
            custom_field_type_en: Some("rooftop".into()),
            ..Default::default()
        };
        assert_eq!(details.field_type_en(), "rooftop");
    }

    #[test]
    fn test_field_type_deserializes_empty_string() {
        let details: SportFacilityDetails = serde_json::from_str(r#"{"field_type": ""}"#).unwrap();
        assert_eq!(details.field_type, FieldType::Unspecified);
        let details: SportFacilityDetails = serde_json::from_str(r#"{"field_type": "indoor"}"#).unwrap();
        assert_eq!(details.field_type, FieldType::Indoor);
    }

    #[test]
    fn test_capacity_zero_is_unlimited() {
        let mut details = SportFacilityDetails::default();
        assert!(details.allows_players(40));
        details.max_capacity = 10;
        assert!(details.allows_players(10));
        assert!(!details.allows_players(11));
    }
}
