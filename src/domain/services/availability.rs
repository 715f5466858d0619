use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::debug;

use crate::domain::models::booking::Booking;
use crate::domain::models::pricing::{PricingSchedule, Slot, TimeWindow};

const SLOT_MINUTES: u32 = 60;

/// Expands the weekday's price windows into one-hour slots for `date`.
///
/// `now` is the facility-local wall clock. When `date` is today, only slots
/// starting strictly after the current time of day survive. Existing bookings
/// are not considered here; see [`mark_availability`].
pub fn generate_slots(schedule: &PricingSchedule, date: NaiveDate, now: NaiveDateTime) -> Vec<Slot> {
    let Some(day) = schedule.day(date.weekday()) else {
        return Vec::new();
    };

    let mut slots: Vec<Slot> = day.time_slots.iter().flat_map(split_window).collect();
    slots.sort_by_key(|slot| slot.start);

    if date == now.date() {
        let current = now.time();
        slots.retain(|slot| slot.start > current);
    }

    slots
}

/// Splits one window into whole hours; a trailing remainder is dropped.
fn split_window(window: &TimeWindow) -> Vec<Slot> {
    let Some((start, end)) = window.bounds() else {
        debug!("Skipping malformed time window {:?}", window);
        return Vec::new();
    };

    let start_min = start.num_seconds_from_midnight() / 60;
    let end_min = end.num_seconds_from_midnight() / 60;
    if end_min <= start_min {
        return Vec::new();
    }

    let count = (end_min - start_min) / SLOT_MINUTES;
    (0..count)
        .map(|i| {
            let slot_start = start + Duration::minutes((i * SLOT_MINUTES) as i64);
            Slot {
                start: slot_start,
                end: slot_start + Duration::minutes(SLOT_MINUTES as i64),
                price: window.price,
            }
        })
        .collect()
}

/// Finds the generated slot starting at `start`, if any.
pub fn find_slot(slots: &[Slot], start: NaiveTime) -> Option<&Slot> {
    slots.iter().find(|slot| slot.start == start)
}

/// Pairs each slot with whether no active booking overlaps it.
pub fn mark_availability(slots: Vec<Slot>, bookings: &[Booking]) -> Vec<(Slot, bool)> {
    slots
        .into_iter()
        .map(|slot| {
            let free = !bookings
                .iter()
                .filter(|b| b.status.is_active())
                .any(|b| b.overlaps(slot.start, slot.end));
            (slot, free)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::pricing::DayPricing;
    use chrono::Weekday;
    use rust_decimal::Decimal;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn schedule_with(weekday: Weekday, windows: Vec<TimeWindow>) -> PricingSchedule {
        let mut schedule = PricingSchedule::default();
        schedule.set_day(weekday, DayPricing { is_weekend: false, time_slots: windows });
        schedule
    }

    // 2030-01-07 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
    }

    fn earlier_day() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_weekday_yields_nothing() {
        let schedule = schedule_with(Weekday::Tue, vec![TimeWindow::new("09:00", "12:00", Decimal::from(50))]);
        assert!(generate_slots(&schedule, monday(), earlier_day()).is_empty());
        assert!(generate_slots(&PricingSchedule::default(), monday(), earlier_day()).is_empty());
    }

    #[test]
    fn test_empty_window_list_yields_nothing() {
        let schedule = schedule_with(Weekday::Mon, vec![]);
        assert!(generate_slots(&schedule, monday(), earlier_day()).is_empty());
    }

    #[test]
    fn test_three_hour_window_splits_into_hours() {
        let schedule = schedule_with(Weekday::Mon, vec![TimeWindow::new("09:00", "12:00", Decimal::from(50))]);
        let slots = generate_slots(&schedule, monday(), earlier_day());

        let pairs: Vec<(NaiveTime, NaiveTime)> = slots.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(pairs, vec![
            (t("09:00"), t("10:00")),
            (t("10:00"), t("11:00")),
            (t("11:00"), t("12:00")),
        ]);
        assert!(slots.iter().all(|s| s.price == Decimal::from(50)));
    }

    #[test]
    fn test_short_window_and_remainder_are_dropped() {
        let schedule = schedule_with(Weekday::Mon, vec![
            TimeWindow::new("09:00", "09:40", Decimal::from(50)),
            TimeWindow::new("14:00", "16:30", Decimal::from(70)),
        ]);
        let slots = generate_slots(&schedule, monday(), earlier_day());
        let starts: Vec<NaiveTime> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![t("14:00"), t("15:00")]);
    }

    #[test]
    fn test_windows_are_merged_and_sorted() {
        let schedule = schedule_with(Weekday::Mon, vec![
            TimeWindow::new("18:00", "20:00", Decimal::from(80)),
            TimeWindow::new("08:00", "09:00", Decimal::from(40)),
        ]);
        let slots = generate_slots(&schedule, monday(), earlier_day());
        let starts: Vec<NaiveTime> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![t("08:00"), t("18:00"), t("19:00")]);
        assert_eq!(slots[0].price, Decimal::from(40));
        assert_eq!(slots[2].price, Decimal::from(80));
    }

    #[test]
    fn test_today_drops_started_slots() {
        let schedule = schedule_with(Weekday::Mon, vec![TimeWindow::new("09:00", "13:00", Decimal::from(50))]);
        let now = monday().and_hms_opt(10, 30, 0).unwrap();
        let starts: Vec<NaiveTime> = generate_slots(&schedule, monday(), now).iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![t("11:00"), t("12:00")]);
    }

    #[test]
    fn test_today_excludes_slot_starting_exactly_now() {
        let schedule = schedule_with(Weekday::Mon, vec![TimeWindow::new("10:00", "12:00", Decimal::from(50))]);
        let now = monday().and_hms_opt(10, 0, 0).unwrap();
        let starts: Vec<NaiveTime> = generate_slots(&schedule, monday(), now).iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![t("11:00")]);
    }

    #[test]
    fn test_other_dates_ignore_time_of_day() {
        let schedule = schedule_with(Weekday::Mon, vec![TimeWindow::new("09:00", "11:00", Decimal::from(50))]);
        let late_sunday = NaiveDate::from_ymd_opt(2030, 1, 6).unwrap().and_hms_opt(23, 0, 0).unwrap();
        assert_eq!(generate_slots(&schedule, monday(), late_sunday).len(), 2);
    }

    #[test]
    fn test_malformed_and_inverted_windows_are_skipped() {
        let schedule = schedule_with(Weekday::Mon, vec![
            TimeWindow::new("9am", "11:00", Decimal::from(50)),
            TimeWindow::new("", "11:00", Decimal::from(50)),
            TimeWindow::new("15:00", "13:00", Decimal::from(50)),
            TimeWindow::new("20:00", "21:00", Decimal::from(60)),
        ]);
        let slots = generate_slots(&schedule, monday(), earlier_day());
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, t("20:00"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let schedule = schedule_with(Weekday::Mon, vec![
            TimeWindow::new("16:00", "19:00", Decimal::new(4550, 2)),
            TimeWindow::new("07:00", "09:00", Decimal::from(30)),
        ]);
        let now = monday().and_hms_opt(6, 15, 0).unwrap();
        assert_eq!(generate_slots(&schedule, monday(), now), generate_slots(&schedule, monday(), now));
    }

    #[test]
    fn test_find_slot_by_start() {
        let schedule = schedule_with(Weekday::Mon, vec![TimeWindow::new("09:00", "11:00", Decimal::from(50))]);
        let slots = generate_slots(&schedule, monday(), earlier_day());
        assert!(find_slot(&slots, t("10:00")).is_some());
        assert!(find_slot(&slots, t("10:30")).is_none());
    }
}
