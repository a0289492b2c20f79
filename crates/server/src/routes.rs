//! The assistant's HTTP surface: a chat endpoint plus direct slot and
//! booking endpoints for non-conversational callers.
//!
//! The server holds no session store. The chat contract echoes the full
//! conversation state back to the caller, who sends it with the next turn,
//! so any replica can serve any request.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use slotty_core::domain::conversation::{ConversationState, TurnRecord};
use slotty_core::errors::BookingError;

use crate::bootstrap::Application;

pub fn router(app: Application) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        .route("/slots", get(slots))
        .route("/book", post(book))
        .with_state(app)
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

fn api_error(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError { error: error.into() }))
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub service: &'static str,
    pub message: &'static str,
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        service: "slotty",
        message: "Scheduling assistant is running. POST /chat to talk to it.",
    })
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<TurnRecord>,
    #[serde(default)]
    pub offered_slots: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub proposed_start: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub history: Vec<TurnRecord>,
    pub offered_slots: Vec<DateTime<Utc>>,
    pub proposed_start: Option<DateTime<Utc>>,
}

pub async fn chat(
    State(app): State<Application>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ApiError>)> {
    if request.message.trim().is_empty() {
        return Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, "message must not be empty"));
    }

    let mut state = ConversationState {
        turns: request.history,
        offered_slots: request.offered_slots,
        proposed_start: request.proposed_start,
    };

    let result = app.orchestrator.handle_turn(&request.message, &mut state, Utc::now()).await;

    Ok(Json(ChatResponse {
        reply: result.reply,
        history: state.turns,
        offered_slots: result.offered_slots,
        proposed_start: result.proposed_start,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    /// Local calendar day, `YYYY-MM-DD`. Defaults to today in the business
    /// timezone.
    #[serde(default)]
    pub day: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SlotPayload {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub day: NaiveDate,
    pub timezone: String,
    pub slots: Vec<SlotPayload>,
}

pub async fn slots(
    State(app): State<Application>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, (StatusCode, Json<ApiError>)> {
    let tz = app.orchestrator.timezone();
    let day = query.day.unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive());

    let slots = app
        .orchestrator
        .day_slots(day)
        .await
        .map_err(|err| api_error(StatusCode::BAD_GATEWAY, err.user_message()))?;

    Ok(Json(SlotsResponse {
        day,
        timezone: tz.to_string(),
        slots: slots
            .into_iter()
            .map(|slot| SlotPayload {
                start: slot.start,
                end: slot.end,
                label: slot.local_label(tz),
            })
            .collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub start: DateTime<Utc>,
    /// Defaults to `start` plus the configured slot length.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub status: &'static str,
    pub event_id: String,
}

pub async fn book(
    State(app): State<Application>,
    Json(request): Json<BookRequest>,
) -> Result<Json<BookResponse>, (StatusCode, Json<ApiError>)> {
    // checked add: a start near the end of representable time must come back
    // as a 422, not overflow the handler.
    let end = match request.end {
        Some(end) => end,
        None => request
            .start
            .checked_add_signed(app.orchestrator.slot_length())
            .ok_or_else(|| {
                api_error(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "start is out of range for the configured slot length",
                )
            })?,
    };
    let summary = request.summary.as_deref().unwrap_or("Scheduled meeting");

    let event_id =
        app.orchestrator.commit_booking(request.start, end, summary).await.map_err(|err| {
            let status = match &err {
                BookingError::InvalidRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                BookingError::SlotTaken { .. } => StatusCode::CONFLICT,
                BookingError::Upstream(_) => StatusCode::BAD_GATEWAY,
            };
            api_error(status, err.user_message())
        })?;

    info!(event_name = "api.booking_created", event_id = %event_id, "booking created via api");
    Ok(Json(BookResponse { status: "booked", event_id }))
}
