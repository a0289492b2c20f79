//! The time resolver: free text plus a reference "now" in, a timezone-aware
//! candidate out.
//!
//! A small set of utility queries ("what time is it") is classified by
//! pattern and answered with exact, deterministic phrasing instead of going
//! through phrase extraction. Everything else runs through the deterministic
//! phrase parser in [`phrase`]; parse failures come back as "no candidate",
//! never as errors.

mod phrase;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::display::{format_day, format_proposal};
use phrase::{parse_phrase, DateRef};

/// Utility queries answered directly, without the general-purpose parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinQuery {
    CurrentTime,
    TodayDate,
    TomorrowDate,
}

/// A resolved, timezone-aware candidate instant.
///
/// `explicit_time` is false when the phrase carried a date but no clock time
/// (the instant is then local midnight); the orchestrator uses the date for
/// slot listings and asks for a time before booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeCandidate {
    pub start: DateTime<Tz>,
    pub explicit_time: bool,
}

impl TimeCandidate {
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn local_date(&self) -> NaiveDate {
        self.start.date_naive()
    }
}

/// Recognizes the built-in utility queries. Checked before any other routing
/// so frequent questions get exact answers.
pub fn builtin_query(text: &str) -> Option<BuiltinQuery> {
    let normalized: String = text
        .to_ascii_lowercase()
        .chars()
        .filter(|c| *c != '\'')
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

    let current_time = ["what time is it", "what is the time", "whats the time", "current time"];
    if current_time.iter().any(|pattern| normalized.contains(pattern)) {
        return Some(BuiltinQuery::CurrentTime);
    }

    if normalized.contains("date") {
        if normalized.contains("tomorrow") {
            return Some(BuiltinQuery::TomorrowDate);
        }
        if normalized.contains("today")
            || normalized.contains("what is the date")
            || normalized.contains("whats the date")
        {
            return Some(BuiltinQuery::TodayDate);
        }
    }

    None
}

/// Wraps phrase parsing with the fixed business timezone. Pure: the reference
/// "now" is always supplied by the caller.
#[derive(Clone, Copy, Debug)]
pub struct TimeResolver {
    tz: Tz,
}

impl TimeResolver {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Resolves a free-text time expression to a concrete candidate, or none
    /// if no date or time is mentioned (or the mention is invalid, e.g.
    /// "february 30"). "No candidate" and "unparsable" are deliberately the
    /// same outcome: both mean "ask the user to clarify".
    pub fn resolve(&self, text: &str, now: DateTime<Utc>) -> Option<TimeCandidate> {
        let parsed = parse_phrase(text);
        let local_now = now.with_timezone(&self.tz);
        let today = local_now.date_naive();

        match (parsed.date, parsed.time) {
            (None, None) => None,
            (Some(date_ref), time) => {
                let date = resolve_date(date_ref, today)?;
                let time_of_day = time.unwrap_or(NaiveTime::MIN);
                let start = self.tz.from_local_datetime(&date.and_time(time_of_day)).earliest()?;
                Some(TimeCandidate { start, explicit_time: time.is_some() })
            }
            (None, Some(time_of_day)) => {
                // A bare clock time means today if it is still ahead, else
                // tomorrow.
                let candidate = self.tz.from_local_datetime(&today.and_time(time_of_day)).earliest()?;
                let start = if candidate > local_now {
                    candidate
                } else {
                    let tomorrow = today.checked_add_days(Days::new(1))?;
                    self.tz.from_local_datetime(&tomorrow.and_time(time_of_day)).earliest()?
                };
                Some(TimeCandidate { start, explicit_time: true })
            }
        }
    }

    /// Deterministic answers for the built-in queries.
    pub fn answer_builtin(&self, query: BuiltinQuery, now: DateTime<Utc>) -> String {
        let local_now = now.with_timezone(&self.tz);
        match query {
            BuiltinQuery::CurrentTime => {
                format!("It's {} right now.", local_now.format("%I:%M %p %Z"))
            }
            BuiltinQuery::TodayDate => {
                format!("Today is {}.", format_day(local_now.date_naive()))
            }
            BuiltinQuery::TomorrowDate => {
                let tomorrow = local_now.date_naive() + Days::new(1);
                format!("Tomorrow is {}.", format_day(tomorrow))
            }
        }
    }

    /// Human form of a candidate for confirmation replies.
    pub fn describe(&self, candidate: &TimeCandidate) -> String {
        format_proposal(candidate.start)
    }
}

fn resolve_date(date_ref: DateRef, today: NaiveDate) -> Option<NaiveDate> {
    match date_ref {
        DateRef::Today => Some(today),
        DateRef::Tomorrow => today.checked_add_days(Days::new(1)),
        DateRef::Weekday { target, next_week } => {
            let today_index = today.weekday().num_days_from_monday();
            let target_index = target.num_days_from_monday();
            let mut ahead = (target_index + 7 - today_index) % 7;
            if next_week && ahead == 0 {
                ahead = 7;
            }
            today.checked_add_days(Days::new(u64::from(ahead)))
        }
        DateRef::MonthDay { month, day, year } => match year {
            Some(year) => NaiveDate::from_ymd_opt(year, month, day),
            None => {
                let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
                if this_year >= today {
                    Some(this_year)
                } else {
                    NaiveDate::from_ymd_opt(today.year() + 1, month, day)
                }
            }
        },
        DateRef::Absolute(date) => Some(date),
    }
}
