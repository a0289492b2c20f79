use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::display::format_clock;

/// An existing calendar commitment, half-open `[start, end)`. Supplied
/// wholesale per query window by the calendar collaborator; read-only here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    /// Half-open overlap test: an interval ending exactly when another starts
    /// does not overlap it.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

/// A candidate bookable window of fixed duration. Never persisted; recomputed
/// per query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Slot {
    /// Human time range in the business timezone, e.g. `09:00 AM – 10:00 AM`.
    pub fn local_label(&self, tz: Tz) -> String {
        format!(
            "{} – {}",
            format_clock(self.start.with_timezone(&tz)),
            format_clock(self.end.with_timezone(&tz))
        )
    }
}

/// The daily local time range within which slots may be offered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use chrono_tz::Asia::Kolkata;

    use super::{BusyInterval, Slot};

    fn instant(h: u32, m: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 6, h, m, 0).unwrap()
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let busy = BusyInterval { start: instant(9, 0), end: instant(10, 0) };
        assert!(!busy.overlaps(instant(10, 0), instant(11, 0)));
        assert!(!busy.overlaps(instant(8, 0), instant(9, 0)));
    }

    #[test]
    fn containment_and_partial_overlap_are_detected() {
        let busy = BusyInterval { start: instant(9, 0), end: instant(10, 0) };
        assert!(busy.overlaps(instant(9, 30), instant(9, 45)));
        assert!(busy.overlaps(instant(8, 30), instant(9, 30)));
        assert!(busy.overlaps(instant(9, 30), instant(10, 30)));
        assert!(busy.overlaps(instant(8, 0), instant(11, 0)));
    }

    #[test]
    fn slot_label_formats_in_the_business_timezone() {
        // 03:30 UTC is 09:00 in Kolkata.
        let slot = Slot { start: instant(3, 30), end: instant(4, 30) };
        assert_eq!(slot.local_label(Kolkata), "09:00 AM – 10:00 AM");
    }
}
