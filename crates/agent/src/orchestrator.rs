//! The per-turn dialogue engine.
//!
//! Routing order matters: confirmations against a pending proposal come
//! first, then selections from the last offered slot list, then the built-in
//! utility queries, and only then fresh intent classification. Later stages
//! never see a turn an earlier stage consumed.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::info;

use slotty_calendar::CalendarClient;
use slotty_core::availability::{day_bounds, free_slots, is_available};
use slotty_core::config::SchedulingConfig;
use slotty_core::display::{format_day, format_proposal};
use slotty_core::domain::conversation::{ConversationState, TurnResult};
use slotty_core::domain::intent::Intent;
use slotty_core::domain::slot::{BusinessWindow, BusyInterval, Slot};
use slotty_core::errors::{BookingError, UpstreamError};
use slotty_core::timeparse::{builtin_query, TimeResolver};

use crate::classifier::IntentClassifier;
use crate::followup::{clock_match, is_affirmative, is_negative, ordinal_index};
use crate::llm::CompletionClient;

pub struct Orchestrator {
    resolver: TimeResolver,
    window: BusinessWindow,
    slot_len: Duration,
    classifier: IntentClassifier,
    calendar: Arc<dyn CalendarClient>,
}

impl Orchestrator {
    pub fn new(
        scheduling: &SchedulingConfig,
        llm: Arc<dyn CompletionClient>,
        calendar: Arc<dyn CalendarClient>,
    ) -> Self {
        Self {
            resolver: TimeResolver::new(scheduling.timezone),
            window: scheduling.window(),
            slot_len: scheduling.slot_duration(),
            classifier: IntentClassifier::new(llm),
            calendar,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.resolver.timezone()
    }

    /// The configured meeting length, used by callers that book directly.
    pub fn slot_length(&self) -> Duration {
        self.slot_len
    }

    /// Runs one user turn against the session state. Infallible by design:
    /// upstream failures become apologetic replies, never dropped turns.
    pub async fn handle_turn(
        &self,
        message: &str,
        state: &mut ConversationState,
        now: DateTime<Utc>,
    ) -> TurnResult {
        state.record_user(message);
        let reply = self.route(message, state, now).await;
        state.record_assistant(&reply);

        info!(
            event_name = "turn.completed",
            proposed = state.proposed_start.is_some(),
            offered = state.offered_slots.len(),
            "turn handled"
        );

        TurnResult {
            reply,
            proposed_start: state.proposed_start,
            offered_slots: state.offered_slots.clone(),
        }
    }

    async fn route(&self, message: &str, state: &mut ConversationState, now: DateTime<Utc>) -> String {
        if let Some(start) = state.proposed_start {
            // An affirmative never books by itself. The proposal stays in the
            // turn result and the caller commits it through the booking
            // endpoint, so a stray "yes" can't mutate the calendar.
            if is_affirmative(message) {
                return format!(
                    "Great, {} it is. Confirm the booking and I'll put it on the calendar.",
                    self.describe(start)
                );
            }
            if is_negative(message) {
                state.clear_proposal();
                return "Okay, I won't book it. Anything else I can check for you?".to_string();
            }
        }

        if !state.offered_slots.is_empty() {
            if let Some(index) = ordinal_index(message) {
                if let Some(&start) = state.offered_slots.get(index) {
                    state.propose(start);
                    return format!("Shall I book {}?", self.describe(start));
                }
                return format!(
                    "I only offered {} slots. Which one did you mean?",
                    state.offered_slots.len()
                );
            }
            if let Some(index) = clock_match(message, &state.offered_slots, &self.resolver, now) {
                let start = state.offered_slots[index];
                state.propose(start);
                return format!("Shall I book {}?", self.describe(start));
            }
        }

        if let Some(query) = builtin_query(message) {
            return self.resolver.answer_builtin(query, now);
        }

        let classified = self.classifier.classify(message).await;
        let phrase = classified.raw_phrase.as_deref().unwrap_or(message);

        match classified.intent {
            Intent::CheckSlots => self.reply_check_slots(phrase, state, now).await,
            Intent::BookMeeting => self.reply_book(phrase, state, now).await,
            Intent::Unknown => classified.canned_reply.unwrap_or_else(|| {
                "I can check free slots or book a meeting for you. \
                 Try \"what slots are free tomorrow?\"."
                    .to_string()
            }),
        }
    }

    async fn reply_check_slots(
        &self,
        phrase: &str,
        state: &mut ConversationState,
        now: DateTime<Utc>,
    ) -> String {
        let Some(candidate) = self.resolver.resolve(phrase, now) else {
            return "Which day should I check? You can say something like \
                    \"tomorrow\" or \"Friday\"."
                .to_string();
        };
        let day = candidate.local_date();

        let busy = match self.busy_for_day(day).await {
            Ok(busy) => busy,
            Err(err) => return err.user_message(),
        };

        let slots = free_slots(day, self.timezone(), &self.window, &busy, self.slot_len);
        if slots.is_empty() {
            state.remember_offer(Vec::new());
            return format!("I'm fully booked on {}. Would another day work?", format_day(day));
        }

        let mut reply = format!("Here's what's free on {}:\n", format_day(day));
        for (index, slot) in slots.iter().enumerate() {
            reply.push_str(&format!("  {}. {}\n", index + 1, slot.local_label(self.timezone())));
        }
        reply.push_str("Which one works for you?");

        state.remember_offer(slots.iter().map(|slot| slot.start).collect());
        reply
    }

    async fn reply_book(
        &self,
        phrase: &str,
        state: &mut ConversationState,
        now: DateTime<Utc>,
    ) -> String {
        let Some(candidate) = self.resolver.resolve(phrase, now) else {
            return "When would you like to meet? You can say something like \
                    \"tomorrow at 3pm\"."
                .to_string();
        };

        if !candidate.explicit_time {
            return format!(
                "What time on {} should I book?",
                format_day(candidate.local_date())
            );
        }

        let start = candidate.start_utc();
        if start <= now {
            return "That time has already passed. Did you mean another day?".to_string();
        }

        let busy = match self.busy_for_day(candidate.local_date()).await {
            Ok(busy) => busy,
            Err(err) => return err.user_message(),
        };

        if !is_available(start, self.slot_len, &busy) {
            state.clear_proposal();
            return format!(
                "{} is already taken. Want me to list the free slots that day?",
                self.describe(start)
            );
        }

        state.propose(start);
        format!("{} is free. Shall I book it?", self.describe(start))
    }

    /// Books `[start, end)` after a final availability check. The only path
    /// that writes to the calendar, reached through the booking endpoint.
    pub async fn commit_booking(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        summary: &str,
    ) -> Result<String, BookingError> {
        if end <= start {
            return Err(BookingError::InvalidRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        let busy = self.calendar.list_busy(start, end).await?;
        if !is_available(start, end - start, &busy) {
            return Err(BookingError::SlotTaken { start: start.to_rfc3339() });
        }

        let event_id = self.calendar.create_event(start, end, summary).await?;
        info!(event_name = "booking.committed", event_id = %event_id, "meeting booked");
        Ok(event_id)
    }

    /// Free slots for one local calendar day, for the direct slots endpoint.
    pub async fn day_slots(&self, day: NaiveDate) -> Result<Vec<Slot>, UpstreamError> {
        let busy = self.busy_for_day(day).await?;
        Ok(free_slots(day, self.timezone(), &self.window, &busy, self.slot_len))
    }

    async fn busy_for_day(&self, day: NaiveDate) -> Result<Vec<BusyInterval>, UpstreamError> {
        let Some((time_min, time_max)) = day_bounds(day, self.timezone()) else {
            return Ok(Vec::new());
        };
        self.calendar.list_busy(time_min, time_max).await
    }

    fn describe(&self, start: DateTime<Utc>) -> String {
        format_proposal(start.with_timezone(&self.timezone()))
    }
}
