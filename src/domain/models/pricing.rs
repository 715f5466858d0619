use chrono::{NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An owner-configured priced interval of arbitrary length within one weekday.
///
/// `start` and `end` are kept as the raw `HH:MM` strings the partner form
/// submits; an empty string means the owner has not filled the field yet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
    pub price: Decimal,
}

impl TimeWindow {
    pub fn new(start: &str, end: &str, price: Decimal) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            price,
        }
    }

    /// Parsed bounds, `None` when either side is missing or malformed.
    pub fn bounds(&self) -> Option<(NaiveTime, NaiveTime)> {
        let start = parse_hhmm(&self.start)?;
        let end = parse_hhmm(&self.end)?;
        Some((start, end))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DayPricing {
    #[serde(rename = "isWeekend")]
    pub is_weekend: bool,
    #[serde(rename = "timeSlots")]
    pub time_slots: Vec<TimeWindow>,
}

/// Per-sport pricing, keyed by weekday name (sunday..saturday).
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PricingSchedule {
    pub sunday: Option<DayPricing>,
    pub monday: Option<DayPricing>,
    pub tuesday: Option<DayPricing>,
    pub wednesday: Option<DayPricing>,
    pub thursday: Option<DayPricing>,
    pub friday: Option<DayPricing>,
    pub saturday: Option<DayPricing>,
}

impl PricingSchedule {
    pub fn day(&self, weekday: Weekday) -> Option<&DayPricing> {
        match weekday {
            Weekday::Sun => self.sunday.as_ref(),
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
        }
    }

    pub fn set_day(&mut self, weekday: Weekday, pricing: DayPricing) {
        let slot = match weekday {
            Weekday::Sun => &mut self.sunday,
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
        };
        *slot = Some(pricing);
    }

    /// Configured days in Sunday..Saturday order, with their lowercase names.
    pub fn configured_days(&self) -> Vec<(&'static str, &DayPricing)> {
        [
            ("sunday", &self.sunday),
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
            ("saturday", &self.saturday),
        ]
        .into_iter()
        .filter_map(|(name, day)| day.as_ref().map(|d| (name, d)))
        .collect()
    }
}

/// A concrete one-hour bookable interval with a fixed price.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Slot {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub price: Decimal,
}

pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Serde adapter for fixed-width 24h `HH:MM` times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hhmm(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid HH:MM time '{}'", raw)))
    }
}
