//! Deterministic extraction of date and clock-time mentions from free text.
//!
//! Normalize, tokenize, then scan: the first date mention and the first clock
//! time win. Anything the scan does not recognize is simply ignored, so a
//! phrase buried in chatter ("could you book me friday at 2pm maybe") still
//! parses.

use chrono::{NaiveDate, NaiveTime, Weekday};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DateRef {
    Today,
    Tomorrow,
    Weekday { target: Weekday, next_week: bool },
    MonthDay { month: u32, day: u32, year: Option<i32> },
    Absolute(NaiveDate),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ParsedPhrase {
    pub date: Option<DateRef>,
    pub time: Option<NaiveTime>,
}

pub(crate) fn parse_phrase(text: &str) -> ParsedPhrase {
    let tokens = tokenize(text);
    let mut parsed = ParsedPhrase::default();
    let mut index = 0;

    while index < tokens.len() {
        if parsed.date.is_none() {
            if let Some((date, consumed)) = date_at(&tokens, index) {
                parsed.date = Some(date);
                index += consumed;
                continue;
            }
        }

        if parsed.time.is_none() {
            if let Some((time, consumed)) = clock_at(&tokens, index) {
                parsed.time = Some(time);
                index += consumed;
                continue;
            }
        }

        index += 1;
    }

    parsed
}

fn tokenize(text: &str) -> Vec<String> {
    let mut sanitized = String::with_capacity(text.len());
    for character in text.to_ascii_lowercase().chars() {
        match character {
            '\'' | '.' => {}
            c if c.is_ascii_alphanumeric() || c == ':' || c == '-' => sanitized.push(c),
            _ => sanitized.push(' '),
        }
    }
    sanitized.split_whitespace().map(|token| token.to_string()).collect()
}

fn date_at(tokens: &[String], index: usize) -> Option<(DateRef, usize)> {
    let token = tokens[index].as_str();

    match token {
        "today" | "tonight" => return Some((DateRef::Today, 1)),
        "tomorrow" => return Some((DateRef::Tomorrow, 1)),
        _ => {}
    }

    if let Some(target) = weekday_name(token) {
        let next_week = index > 0 && tokens[index - 1] == "next";
        return Some((DateRef::Weekday { target, next_week }, 1));
    }

    if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        return Some((DateRef::Absolute(date), 1));
    }

    if let Some(month) = month_name(token) {
        // "june 5" or "june 5 2026"
        if let Some(day) = tokens.get(index + 1).and_then(|t| day_number(t)) {
            let year = tokens.get(index + 2).and_then(|t| year_number(t));
            let consumed = if year.is_some() { 3 } else { 2 };
            return Some((DateRef::MonthDay { month, day, year }, consumed));
        }
        // "5 june" already consumed the day token; handled below.
    }

    // "5 june" / "5th june"
    if let Some(day) = day_number(token) {
        if let Some(month) = tokens.get(index + 1).and_then(|t| month_name(t)) {
            let year = tokens.get(index + 2).and_then(|t| year_number(t));
            let consumed = if year.is_some() { 3 } else { 2 };
            return Some((DateRef::MonthDay { month, day, year }, consumed));
        }
    }

    None
}

fn clock_at(tokens: &[String], index: usize) -> Option<(NaiveTime, usize)> {
    let token = tokens[index].as_str();

    match token {
        "noon" | "midday" => return NaiveTime::from_hms_opt(12, 0, 0).map(|t| (t, 1)),
        "midnight" => return NaiveTime::from_hms_opt(0, 0, 0).map(|t| (t, 1)),
        _ => {}
    }

    if let Some(time) = clock_token(token, None) {
        return Some((time, 1));
    }

    // "3 pm" split across two tokens
    if let Some(meridiem) = tokens.get(index + 1).and_then(|t| meridiem_name(t)) {
        if let Some(time) = clock_token(token, Some(meridiem)) {
            return Some((time, 2));
        }
    }

    None
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

fn clock_token(token: &str, trailing: Option<Meridiem>) -> Option<NaiveTime> {
    let (body, meridiem) = if let Some(prefix) = token.strip_suffix("pm") {
        (prefix, Some(Meridiem::Pm))
    } else if let Some(prefix) = token.strip_suffix("am") {
        (prefix, Some(Meridiem::Am))
    } else {
        (token, trailing)
    };

    if body.is_empty() {
        return None;
    }

    let (raw_hour, minute) = match body.split_once(':') {
        Some((hour, minute)) => (hour.parse::<u32>().ok()?, minute.parse::<u32>().ok()?),
        None => (body.parse::<u32>().ok()?, 0),
    };

    let hour = match meridiem {
        Some(Meridiem::Pm) => match raw_hour {
            12 => 12,
            1..=11 => raw_hour + 12,
            _ => return None,
        },
        Some(Meridiem::Am) => match raw_hour {
            12 => 0,
            1..=11 => raw_hour,
            _ => return None,
        },
        // A bare number is too ambiguous; only colon forms count as 24h.
        None if body.contains(':') => raw_hour,
        None => return None,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn meridiem_name(token: &str) -> Option<Meridiem> {
    match token {
        "am" => Some(Meridiem::Am),
        "pm" => Some(Meridiem::Pm),
        _ => None,
    }
}

fn weekday_name(token: &str) -> Option<Weekday> {
    match token {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn month_name(token: &str) -> Option<u32> {
    let month = match token {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn day_number(token: &str) -> Option<u32> {
    let trimmed = token
        .strip_suffix("st")
        .or_else(|| token.strip_suffix("nd"))
        .or_else(|| token.strip_suffix("rd"))
        .or_else(|| token.strip_suffix("th"))
        .unwrap_or(token);
    let day = trimmed.parse::<u32>().ok()?;
    (1..=31).contains(&day).then_some(day)
}

fn year_number(token: &str) -> Option<i32> {
    if token.len() != 4 {
        return None;
    }
    token.parse::<i32>().ok().filter(|year| (2000..=2100).contains(year))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, Weekday};

    use super::{parse_phrase, DateRef};

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn extracts_weekday_and_meridiem_time_from_chatter() {
        let parsed = parse_phrase("Could you book me Friday at 2pm please?");
        assert_eq!(
            parsed.date,
            Some(DateRef::Weekday { target: Weekday::Fri, next_week: false })
        );
        assert_eq!(parsed.time, Some(time(14, 0)));
    }

    #[test]
    fn recognizes_relative_days() {
        assert_eq!(parse_phrase("any slots tomorrow?").date, Some(DateRef::Tomorrow));
        assert_eq!(parse_phrase("free today").date, Some(DateRef::Today));
    }

    #[test]
    fn recognizes_next_weekday() {
        let parsed = parse_phrase("next monday at 10 am");
        assert_eq!(
            parsed.date,
            Some(DateRef::Weekday { target: Weekday::Mon, next_week: true })
        );
        assert_eq!(parsed.time, Some(time(10, 0)));
    }

    #[test]
    fn recognizes_month_day_in_both_orders() {
        assert_eq!(
            parse_phrase("how about june 5?").date,
            Some(DateRef::MonthDay { month: 6, day: 5, year: None })
        );
        assert_eq!(
            parse_phrase("5th June works").date,
            Some(DateRef::MonthDay { month: 6, day: 5, year: None })
        );
        assert_eq!(
            parse_phrase("june 5 2026").date,
            Some(DateRef::MonthDay { month: 6, day: 5, year: Some(2026) })
        );
    }

    #[test]
    fn recognizes_iso_dates_and_colon_times() {
        let parsed = parse_phrase("2026-08-27 at 15:30");
        assert_eq!(
            parsed.date,
            Some(DateRef::Absolute(NaiveDate::from_ymd_opt(2026, 8, 27).unwrap()))
        );
        assert_eq!(parsed.time, Some(time(15, 30)));
    }

    #[test]
    fn twelve_hour_edges_map_correctly() {
        assert_eq!(parse_phrase("12pm").time, Some(time(12, 0)));
        assert_eq!(parse_phrase("12am").time, Some(time(0, 0)));
        assert_eq!(parse_phrase("noon").time, Some(time(12, 0)));
        assert_eq!(parse_phrase("3:30 pm").time, Some(time(15, 30)));
    }

    #[test]
    fn bare_numbers_without_meridiem_are_not_times() {
        let parsed = parse_phrase("I have 3 meetings");
        assert_eq!(parsed.time, None);
        assert_eq!(parsed.date, None);
    }

    #[test]
    fn no_mention_yields_empty_parse() {
        let parsed = parse_phrase("hello there, how are you?");
        assert_eq!(parsed.date, None);
        assert_eq!(parsed.time, None);
    }
}
