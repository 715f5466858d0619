use rust_decimal::Decimal;

use crate::domain::models::pricing::Slot;

/// Flat hourly rate of the chosen slot times the requested hours.
///
/// Adjacent slots are not consulted: a 3 hour booking starting in an 80/h
/// slot costs 240 even if the following hour is priced differently.
pub fn total_price(slot: &Slot, duration_hours: u32) -> Decimal {
    slot.price * Decimal::from(duration_hours)
}
