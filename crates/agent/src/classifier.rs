//! Two-tier intent classification.
//!
//! A small table of deterministic rules handles the common scheduling
//! phrasings without any network call. Only utterances no rule recognizes go
//! to the language model, and its output is treated as untrusted text: the
//! classifier extracts a single JSON object, collapses bad tags to `Unknown`,
//! and scrubs the reply before anything reaches the user.

use std::sync::Arc;

use regex::Regex;
use tracing::{debug, warn};

use slotty_core::domain::intent::{ClassificationResult, Intent};
use slotty_core::errors::UpstreamError;

use crate::llm::CompletionClient;

struct RulePattern {
    name: &'static str,
    intent: Intent,
    pattern: Regex,
}

fn rule(name: &'static str, intent: Intent, pattern: &str) -> RulePattern {
    RulePattern {
        name,
        intent,
        pattern: Regex::new(pattern).expect("hard-coded rule pattern compiles"),
    }
}

/// First match wins, so the more specific availability phrasings sit above
/// the bare booking verbs.
fn rule_table() -> Vec<RulePattern> {
    vec![
        rule("free-then-slot", Intent::CheckSlots, r"\b(free|available|open)\b.*\b(slots?|times?)\b"),
        rule("slot-then-free", Intent::CheckSlots, r"\b(slots?|times?)\b.*\b(free|available|open)\b"),
        rule("when-free", Intent::CheckSlots, r"\bwhen are you (free|available)\b"),
        rule("any-opening", Intent::CheckSlots, r"\bany (slots?|openings?)\b"),
        rule("availability", Intent::CheckSlots, r"\bavailability\b"),
        rule("booking-verb", Intent::BookMeeting, r"\b(book|schedule|reserve)\b"),
        rule("set-up-meeting", Intent::BookMeeting, r"\bset up\b.*\b(meeting|call)\b"),
    ]
}

pub struct IntentClassifier {
    rules: Vec<RulePattern>,
    llm: Arc<dyn CompletionClient>,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { rules: rule_table(), llm }
    }

    /// Classifies one utterance. Never fails: transport and parse problems
    /// collapse to `Unknown` with a user-facing diagnostic as the reply.
    pub async fn classify(&self, utterance: &str) -> ClassificationResult {
        let normalized = utterance.to_ascii_lowercase();

        if let Some(hit) = self.rules.iter().find(|rule| rule.pattern.is_match(&normalized)) {
            debug!(
                event_name = "classifier.rule_hit",
                rule = hit.name,
                intent = hit.intent.as_str(),
                "utterance classified by rule"
            );
            return ClassificationResult {
                intent: hit.intent,
                raw_phrase: Some(utterance.to_string()),
                canned_reply: None,
            };
        }

        let prompt = build_prompt(utterance);
        let completion = match self.llm.complete(&prompt).await {
            Ok(completion) => completion,
            Err(err) => {
                warn!(event_name = "classifier.llm_unreachable", error = %err, "falling back to unknown");
                return ClassificationResult::unknown(err.user_message());
            }
        };

        match parse_completion(&completion) {
            Ok(turn) => {
                debug!(
                    event_name = "classifier.llm_classified",
                    intent = turn.intent.as_str(),
                    "utterance classified by model"
                );
                ClassificationResult {
                    intent: turn.intent,
                    raw_phrase: turn.datetime.or_else(|| Some(utterance.to_string())),
                    canned_reply: turn.reply,
                }
            }
            Err(err) => {
                warn!(event_name = "classifier.llm_malformed", error = %err, "discarding completion");
                ClassificationResult::unknown(err.user_message())
            }
        }
    }
}

fn build_prompt(utterance: &str) -> String {
    format!(
        "You are a scheduling assistant. Read the user's message and answer with a \
single JSON object and nothing else, of the form \
{{\"reply\": \"...\", \"intent\": \"check_slots|book_meeting|unknown\", \"datetime\": \"...\"}}.\n\
- \"intent\" is check_slots when the user asks what times are free, \
book_meeting when the user wants to schedule something, and unknown otherwise.\n\
- \"datetime\" is the user's time phrase copied verbatim, or null if none.\n\
- \"reply\" is one short sentence. Never claim that anything was booked, and \
never write lines on behalf of the user.\n\n\
User message: \"{utterance}\"\n\
JSON:"
    )
}

#[derive(Debug, PartialEq, Eq)]
struct LlmTurn {
    intent: Intent,
    datetime: Option<String>,
    reply: Option<String>,
}

#[derive(serde::Deserialize)]
struct LlmTurnWire {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    datetime: Option<String>,
}

fn parse_completion(raw: &str) -> Result<LlmTurn, UpstreamError> {
    let object = extract_last_json_object(raw).ok_or_else(|| {
        UpstreamError::MalformedCompletion("no json object in completion".to_string())
    })?;

    let wire: LlmTurnWire = serde_json::from_str(object)
        .map_err(|err| UpstreamError::MalformedCompletion(err.to_string()))?;

    Ok(LlmTurn {
        intent: wire.intent.as_deref().map(Intent::from_tag).unwrap_or(Intent::Unknown),
        datetime: wire.datetime.filter(|value| !value.trim().is_empty()),
        reply: wire.reply.map(|reply| scrub_reply(&reply)).filter(|reply| !reply.is_empty()),
    })
}

/// Completion models tend to keep generating past the object they were asked
/// for, sometimes role-playing further dialogue. Take the last object that
/// actually deserializes.
fn extract_last_json_object(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    let mut candidates = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (index, byte) in bytes.iter().enumerate() {
        match byte {
            b'{' => {
                if depth == 0 {
                    start = Some(index);
                }
                depth += 1;
            }
            b'}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(open) = start.take() {
                            candidates.push(&raw[open..=index]);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    candidates
        .into_iter()
        .rev()
        .find(|candidate| serde_json::from_str::<serde_json::Value>(candidate).is_ok())
}

/// Strips role markers and neutralizes claims the model is not allowed to
/// make. A completion that asserts a booking happened becomes a question.
fn scrub_reply(reply: &str) -> String {
    let mut cleaned = reply.trim();
    for marker in ["User:", "user:", "Assistant:", "assistant:"] {
        if let Some(stripped) = cleaned.strip_prefix(marker) {
            cleaned = stripped.trim();
        }
        if let Some(index) = cleaned.find(marker) {
            cleaned = cleaned[..index].trim();
        }
    }

    let lowered = cleaned.to_ascii_lowercase();
    let claims_booking = ["i've booked", "i have booked", "i booked", "your meeting is booked"]
        .iter()
        .any(|claim| lowered.contains(claim));
    if claims_booking {
        return "Would you like me to book it?".to_string();
    }

    cleaned.to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use slotty_core::domain::intent::Intent;
    use slotty_core::errors::UpstreamError;

    use super::{extract_last_json_object, parse_completion, scrub_reply, IntentClassifier};
    use crate::llm::CompletionClient;

    struct ScriptedLlm {
        responses: Mutex<Vec<Result<String, UpstreamError>>>,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<Result<String, UpstreamError>>) -> Arc<Self> {
            Arc::new(Self { responses: Mutex::new(responses) })
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, UpstreamError> {
            self.responses
                .lock()
                .expect("scripted responses lock")
                .pop()
                .unwrap_or_else(|| Err(UpstreamError::Completion("script exhausted".to_string())))
        }
    }

    #[tokio::test]
    async fn common_phrasings_never_reach_the_model() {
        let llm = ScriptedLlm::new(Vec::new());
        let classifier = IntentClassifier::new(llm);

        for utterance in [
            "What slots are free tomorrow?",
            "when are you free on friday",
            "any openings next week?",
            "Book me Monday at 2pm",
            "can we schedule a call",
        ] {
            let result = classifier.classify(utterance).await;
            assert_ne!(result.intent, Intent::Unknown, "rule should classify: {utterance}");
            assert_eq!(result.raw_phrase.as_deref(), Some(utterance));
        }
    }

    #[tokio::test]
    async fn model_json_is_parsed_for_unmatched_utterances() {
        let llm = ScriptedLlm::new(vec![Ok(
            r#"{"reply": "Happy to help with scheduling.", "intent": "check_slots", "datetime": "tomorrow"}"#
                .to_string(),
        )]);
        let classifier = IntentClassifier::new(llm);

        let result = classifier.classify("hmm, tomorrow maybe?").await;

        assert_eq!(result.intent, Intent::CheckSlots);
        assert_eq!(result.raw_phrase.as_deref(), Some("tomorrow"));
    }

    #[tokio::test]
    async fn transport_failure_collapses_to_unknown_with_diagnostic() {
        let llm = ScriptedLlm::new(vec![Err(UpstreamError::Completion("timed out".to_string()))]);
        let classifier = IntentClassifier::new(llm);

        let result = classifier.classify("ehh").await;

        assert_eq!(result.intent, Intent::Unknown);
        let reply = result.canned_reply.unwrap_or_default();
        assert!(reply.contains("language service"));
        assert!(reply.contains("timed out"));
    }

    #[test]
    fn the_last_wellformed_object_wins() {
        let raw = r#"Sure! {"broken": } then {"intent": "book_meeting"} User: ok"#;
        assert_eq!(extract_last_json_object(raw), Some(r#"{"intent": "book_meeting"}"#));
    }

    #[test]
    fn completions_without_json_are_malformed() {
        assert!(parse_completion("I would love to help!").is_err());
        assert!(parse_completion("{not json}").is_err());
    }

    #[test]
    fn unrecognized_intent_tags_collapse_to_unknown() {
        let turn = parse_completion(r#"{"intent": "cancel_everything"}"#).unwrap();
        assert_eq!(turn.intent, Intent::Unknown);
    }

    #[test]
    fn replies_are_scrubbed_of_roleplay_and_booking_claims() {
        assert_eq!(
            scrub_reply("Assistant: Happy to help. User: great, thanks!"),
            "Happy to help."
        );
        assert_eq!(
            scrub_reply("I've booked your meeting for Friday."),
            "Would you like me to book it?"
        );
    }
}
