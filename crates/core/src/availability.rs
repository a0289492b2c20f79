//! Free-slot computation and point-in-time availability checks.
//!
//! Pure functions over a supplied interval set: the caller fetches busy
//! intervals from the calendar collaborator and decides what to pass when
//! that fetch fails. Given identical inputs the output is identical and fully
//! ordered, so everything here is unit-testable without a network.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::domain::slot::{BusinessWindow, BusyInterval, Slot};

/// Maps a local wall-clock time on `day` to a UTC instant. DST-ambiguous or
/// skipped local times take the earliest valid mapping.
pub fn local_instant(day: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&day.and_time(time))
        .earliest()
        .map(|instant| instant.with_timezone(&Utc))
}

/// UTC bounds of the local calendar day `[00:00, 00:00 next day)`, used as
/// the busy-interval query window.
pub fn day_bounds(day: NaiveDate, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = local_instant(day, NaiveTime::MIN, tz)?;
    let end = local_instant(day.succ_opt()?, NaiveTime::MIN, tz)?;
    Some((start, end))
}

/// Every free `slot_len`-wide window inside the business window on `day`, in
/// chronological order. Walks from the open time stepping by `slot_len`;
/// a trailing partial window is excluded. A slot is retained iff it overlaps
/// no busy interval under half-open `[start, end)` semantics.
pub fn free_slots(
    day: NaiveDate,
    tz: Tz,
    window: &BusinessWindow,
    busy: &[BusyInterval],
    slot_len: Duration,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    let (Some(open), Some(close)) =
        (local_instant(day, window.open, tz), local_instant(day, window.close, tz))
    else {
        return slots;
    };

    let mut cursor = open;
    while cursor + slot_len <= close {
        let end = cursor + slot_len;
        if !busy.iter().any(|interval| interval.overlaps(cursor, end)) {
            slots.push(Slot { start: cursor, end });
        }
        cursor = end;
    }
    slots
}

/// True iff `[start, start + duration)` overlaps no busy interval.
pub fn is_available(start: DateTime<Utc>, duration: Duration, busy: &[BusyInterval]) -> bool {
    let end = start + duration;
    !busy.iter().any(|interval| interval.overlaps(start, end))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
    use chrono_tz::Asia::Kolkata;
    use chrono_tz::Tz;

    use super::{day_bounds, free_slots, is_available, local_instant};
    use crate::domain::slot::{BusinessWindow, BusyInterval};

    const TZ: Tz = Kolkata;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 6).unwrap()
    }

    fn window() -> BusinessWindow {
        BusinessWindow {
            open: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            close: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        }
    }

    fn local(h: u32, m: u32) -> chrono::DateTime<Utc> {
        local_instant(day(), NaiveTime::from_hms_opt(h, m, 0).unwrap(), TZ).unwrap()
    }

    #[test]
    fn one_morning_meeting_leaves_seven_hourly_slots() {
        let busy = vec![BusyInterval { start: local(9, 0), end: local(10, 0) }];

        let slots = free_slots(day(), TZ, &window(), &busy, Duration::minutes(60));

        assert_eq!(slots.len(), 7);
        assert_eq!(slots[0].start, local(10, 0));
        assert_eq!(slots[0].end, local(11, 0));
        assert_eq!(slots.last().unwrap().start, local(16, 0));
        assert_eq!(slots.last().unwrap().end, local(17, 0));
    }

    #[test]
    fn empty_busy_set_fills_the_whole_window_in_order() {
        let slots = free_slots(day(), TZ, &window(), &[], Duration::minutes(60));

        assert_eq!(slots.len(), 8);
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "slots must be chronological and contiguous");
        }
    }

    #[test]
    fn a_slot_ending_exactly_at_a_busy_start_is_free() {
        let busy = vec![BusyInterval { start: local(10, 0), end: local(11, 0) }];

        let slots = free_slots(day(), TZ, &window(), &busy, Duration::minutes(60));

        assert!(slots.iter().any(|slot| slot.start == local(9, 0)));
        assert!(slots.iter().any(|slot| slot.start == local(11, 0)));
        assert!(!slots.iter().any(|slot| slot.start == local(10, 0)));
    }

    #[test]
    fn partial_trailing_slot_is_excluded() {
        let narrow = BusinessWindow {
            open: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            close: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        };

        let slots = free_slots(day(), TZ, &narrow, &[], Duration::minutes(60));

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, local(9, 0));
    }

    #[test]
    fn no_returned_slot_overlaps_any_busy_interval() {
        let busy = vec![
            BusyInterval { start: local(9, 30), end: local(10, 15) },
            BusyInterval { start: local(13, 0), end: local(14, 0) },
            BusyInterval { start: local(16, 45), end: local(17, 0) },
        ];

        let slots = free_slots(day(), TZ, &window(), &busy, Duration::minutes(30));

        for slot in &slots {
            for interval in &busy {
                assert!(
                    !interval.overlaps(slot.start, slot.end),
                    "slot starting {} overlaps busy interval starting {}",
                    slot.start,
                    interval.start
                );
            }
        }
    }

    #[test]
    fn free_slots_is_idempotent() {
        let busy = vec![BusyInterval { start: local(11, 0), end: local(12, 0) }];

        let first = free_slots(day(), TZ, &window(), &busy, Duration::minutes(30));
        let second = free_slots(day(), TZ, &window(), &busy, Duration::minutes(30));

        assert_eq!(first, second);
    }

    #[test]
    fn fully_booked_day_yields_no_slots() {
        let busy = vec![BusyInterval { start: local(9, 0), end: local(17, 0) }];

        let slots = free_slots(day(), TZ, &window(), &busy, Duration::minutes(60));

        assert!(slots.is_empty());
    }

    #[test]
    fn is_available_uses_half_open_semantics() {
        let busy = vec![BusyInterval { start: local(14, 0), end: local(15, 0) }];

        assert!(!is_available(local(14, 0), Duration::minutes(60), &busy));
        assert!(!is_available(local(14, 30), Duration::minutes(60), &busy));
        assert!(!is_available(local(13, 30), Duration::minutes(60), &busy));
        assert!(is_available(local(13, 0), Duration::minutes(60), &busy));
        assert!(is_available(local(15, 0), Duration::minutes(60), &busy));
    }

    #[test]
    fn day_bounds_cover_the_local_day_in_utc() {
        let (start, end) = day_bounds(day(), TZ).unwrap();

        // Kolkata midnight is 18:30 UTC the previous evening.
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 5, 18, 30, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 6, 18, 30, 0).unwrap());
    }

    #[test]
    fn round_trip_through_utc_preserves_local_wall_clock() {
        let instant =
            local_instant(day(), NaiveTime::from_hms_opt(14, 0, 0).unwrap(), TZ).unwrap();
        let back = instant.with_timezone(&TZ);

        assert_eq!(back.format("%H:%M").to_string(), "14:00");
        assert_eq!(back.date_naive(), day());
    }
}
