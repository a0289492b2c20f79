pub mod availability;
pub mod config;
pub mod display;
pub mod domain;
pub mod errors;
pub mod timeparse;

pub use availability::{day_bounds, free_slots, is_available, local_instant};
pub use domain::conversation::{ConversationState, Role, TurnRecord, TurnResult};
pub use domain::intent::{ClassificationResult, Intent};
pub use domain::slot::{BusinessWindow, BusyInterval, Slot};
pub use errors::{BookingError, UpstreamError};
pub use timeparse::{BuiltinQuery, TimeCandidate, TimeResolver};
