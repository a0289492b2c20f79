use serde::{Deserialize, Serialize};

/// What the user is asking for this turn. Produced fresh each turn and never
/// persisted beyond it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CheckSlots,
    BookMeeting,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckSlots => "check_slots",
            Self::BookMeeting => "book_meeting",
            Self::Unknown => "unknown",
        }
    }

    /// Parses an intent tag from untrusted generated text. Unrecognized tags
    /// collapse to `Unknown` rather than erroring.
    pub fn from_tag(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "check_slots" => Self::CheckSlots,
            "book_meeting" => Self::BookMeeting,
            _ => Self::Unknown,
        }
    }
}

/// Output of the intent classifier for one utterance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationResult {
    pub intent: Intent,
    /// The raw time phrase to hand to the time resolver, if one was mentioned.
    pub raw_phrase: Option<String>,
    /// A ready-made reply for turns that need no scheduling work.
    pub canned_reply: Option<String>,
}

impl ClassificationResult {
    pub fn unknown(reply: impl Into<String>) -> Self {
        Self { intent: Intent::Unknown, raw_phrase: None, canned_reply: Some(reply.into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::Intent;

    #[test]
    fn tags_round_trip() {
        for intent in [Intent::CheckSlots, Intent::BookMeeting, Intent::Unknown] {
            assert_eq!(Intent::from_tag(intent.as_str()), intent);
        }
    }

    #[test]
    fn unrecognized_tags_collapse_to_unknown() {
        assert_eq!(Intent::from_tag("cancel_meeting"), Intent::Unknown);
        assert_eq!(Intent::from_tag(""), Intent::Unknown);
        assert_eq!(Intent::from_tag("  Book_Meeting  "), Intent::BookMeeting);
    }
}
