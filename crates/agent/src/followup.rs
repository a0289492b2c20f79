//! Interpretation of short follow-up turns against session state: "yes",
//! "the second one", "10am". These never go near the language model.

use chrono::{DateTime, Utc};

use slotty_core::display::format_clock;
use slotty_core::timeparse::TimeResolver;

const AFFIRMATIVE_TOKENS: &[&str] =
    &["yes", "yeah", "yep", "yup", "sure", "ok", "okay", "confirm", "confirmed", "definitely"];

const AFFIRMATIVE_PHRASES: &[&str] =
    &["go ahead", "sounds good", "book it", "do it", "please do", "works for me"];

const NEGATIVE_TOKENS: &[&str] = &["no", "nope", "nah", "cancel", "dont", "don't"];

fn tokens(text: &str) -> Vec<String> {
    text.to_ascii_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '\''))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}

/// True for a clear confirmation. Deliberately conservative: anything that
/// also mentions a new time should be re-routed, not confirmed, so mixed
/// phrases like "yes but make it friday" are not matched here.
pub fn is_affirmative(text: &str) -> bool {
    let tokens = tokens(text);
    if tokens.len() <= 3 && tokens.iter().any(|t| AFFIRMATIVE_TOKENS.contains(&t.as_str())) {
        return true;
    }
    let joined = tokens.join(" ");
    AFFIRMATIVE_PHRASES.contains(&joined.as_str())
}

pub fn is_negative(text: &str) -> bool {
    let tokens = tokens(text);
    tokens.len() <= 3 && tokens.iter().any(|t| NEGATIVE_TOKENS.contains(&t.as_str()))
}

/// Zero-based index for ordinal references like "the second one" or "3rd".
pub fn ordinal_index(text: &str) -> Option<usize> {
    const WORDS: &[&str] = &[
        "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
        "tenth",
    ];

    for token in tokens(text) {
        if let Some(position) = WORDS.iter().position(|word| *word == token) {
            return Some(position);
        }

        let stripped = token
            .strip_suffix("st")
            .or_else(|| token.strip_suffix("nd"))
            .or_else(|| token.strip_suffix("rd"))
            .or_else(|| token.strip_suffix("th"));
        if let Some(number) = stripped.and_then(|s| s.parse::<usize>().ok()) {
            if number >= 1 {
                return Some(number - 1);
            }
        }
    }

    None
}

/// Matches a bare clock-time follow-up ("10am") against the offered starts.
/// Both sides are rendered with [`format_clock`], so whatever wording was
/// shown to the user is exactly what matches.
pub fn clock_match(
    text: &str,
    offered: &[DateTime<Utc>],
    resolver: &TimeResolver,
    now: DateTime<Utc>,
) -> Option<usize> {
    let candidate = resolver.resolve(text, now)?;
    if !candidate.explicit_time {
        return None;
    }

    let wanted = format_clock(candidate.start);
    offered
        .iter()
        .position(|start| format_clock(start.with_timezone(&resolver.timezone())) == wanted)
}
