//! Human-readable formatting for instants, always in the business timezone.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

/// `09:00 AM` — the time-of-day form used in slot listings and bare
/// clock-time follow-up matching. Both sides of that comparison must use this
/// one function so a literal "3pm" can match an offered slot.
pub fn format_clock(instant: DateTime<Tz>) -> String {
    instant.format("%I:%M %p").to_string()
}

/// `Friday, March 06` — the day heading used in slot listings.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%A, %B %d").to_string()
}

/// `Friday, March 06 at 02:00 PM` — the form used when proposing a booking.
pub fn format_proposal(instant: DateTime<Tz>) -> String {
    instant.format("%A, %B %d at %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::Asia::Kolkata;

    use super::{format_clock, format_day, format_proposal};

    #[test]
    fn clock_uses_twelve_hour_form() {
        let instant =
            Utc.with_ymd_and_hms(2026, 3, 6, 8, 30, 0).unwrap().with_timezone(&Kolkata);
        assert_eq!(format_clock(instant), "02:00 PM");
    }

    #[test]
    fn day_heading_names_the_weekday() {
        assert_eq!(format_day(NaiveDate::from_ymd_opt(2026, 3, 6).unwrap()), "Friday, March 06");
    }

    #[test]
    fn proposal_carries_day_and_time() {
        let instant =
            Utc.with_ymd_and_hms(2026, 3, 6, 8, 30, 0).unwrap().with_timezone(&Kolkata);
        assert_eq!(format_proposal(instant), "Friday, March 06 at 02:00 PM");
    }
}
