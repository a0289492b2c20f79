use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub role: Role,
    pub text: String,
}

/// Per-session memory, owned exclusively by one session and mutated only by
/// the orchestrator. The caller holds it in memory for the session's lifetime;
/// nothing here survives a process restart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub turns: Vec<TurnRecord>,
    /// The last slot list offered, in chronological order. Used to resolve
    /// ordinal and bare clock-time follow-ups.
    pub offered_slots: Vec<DateTime<Utc>>,
    /// A single candidate start awaiting explicit confirmation.
    pub proposed_start: Option<DateTime<Utc>>,
}

impl ConversationState {
    pub fn record_user(&mut self, text: &str) {
        self.turns.push(TurnRecord { role: Role::User, text: text.to_string() });
    }

    pub fn record_assistant(&mut self, text: &str) {
        self.turns.push(TurnRecord { role: Role::Assistant, text: text.to_string() });
    }

    /// Replaces the offered list. A fresh offer invalidates any pending
    /// proposal so the two fields stay mutually consistent.
    pub fn remember_offer(&mut self, starts: Vec<DateTime<Utc>>) {
        self.offered_slots = starts;
        self.proposed_start = None;
    }

    pub fn propose(&mut self, start: DateTime<Utc>) {
        self.proposed_start = Some(start);
    }

    pub fn clear_proposal(&mut self) {
        self.proposed_start = None;
    }
}

/// The structured result of one turn, consumed by the presentation layer
/// alongside the natural-language reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    pub reply: String,
    pub proposed_start: Option<DateTime<Utc>>,
    pub offered_slots: Vec<DateTime<Utc>>,
}
