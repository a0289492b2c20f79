use thiserror::Error;

/// Failures reaching the two external collaborators.
///
/// Each variant maps to exactly one user-facing sentence via
/// [`UpstreamError::user_message`], so the wording lives in one place instead
/// of being reformatted at every call site.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("text generation request failed: {0}")]
    Completion(String),
    #[error("text generation returned an unusable payload: {0}")]
    MalformedCompletion(String),
    #[error("calendar request failed: {0}")]
    Calendar(String),
}

impl UpstreamError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Completion(detail) => format!(
                "Sorry, I couldn't reach my language service ({detail}). \
                 Please try again in a moment."
            ),
            Self::MalformedCompletion(_) => {
                "Sorry, I couldn't make sense of that. Could you rephrase your request?"
                    .to_string()
            }
            Self::Calendar(detail) => format!(
                "Sorry, I couldn't reach the calendar ({detail}). \
                 Please try again in a moment."
            ),
        }
    }
}

/// Failures on the booking-commit path. Propagated to the caller as a failed
/// booking status; the orchestrator never retries a write.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("booking rejected: end {end} is not after start {start}")]
    InvalidRange { start: String, end: String },
    #[error("booking rejected: the window starting {start} is already taken")]
    SlotTaken { start: String },
}

impl BookingError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Upstream(upstream) => upstream.user_message(),
            Self::InvalidRange { .. } => {
                "That booking window is not valid: the end time must be after the start time."
                    .to_string()
            }
            Self::SlotTaken { .. } => {
                "That time is already taken. Would you like to pick another slot?".to_string()
            }
        }
    }
}
