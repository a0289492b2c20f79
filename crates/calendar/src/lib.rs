//! Calendar backend access for the scheduling assistant.
//!
//! The orchestrator only ever needs two things from a calendar: the busy
//! intervals inside a window, and event creation. Both live behind the
//! [`CalendarClient`] trait so the conversational core can be exercised
//! against an in-memory double.

pub mod client;

pub use client::{CalendarClient, HttpCalendarClient, StaticCalendar};
