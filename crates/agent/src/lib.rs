//! The conversational core of the scheduling assistant.
//!
//! Each user turn runs a constrained loop:
//! 1. **Follow-up interpretation** (`followup`) - confirmations and slot
//!    selections against the session's pending offer
//! 2. **Intent classification** (`classifier`) - deterministic rules first,
//!    the language model as fallback
//! 3. **Time resolution** - free text to a concrete timezone-aware instant
//! 4. **Availability and booking** - pure slot math over calendar data
//!
//! # Safety Principle
//!
//! The language model is strictly a translator. It never decides what is
//! free, never books anything, and never invents times. Availability and
//! bookings are deterministic outcomes computed from calendar data.

pub mod classifier;
pub mod followup;
pub mod llm;
pub mod orchestrator;

pub use classifier::IntentClassifier;
pub use llm::{CompletionClient, HttpCompletionClient};
pub use orchestrator::Orchestrator;
