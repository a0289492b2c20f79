//! HTTP calendar client plus an in-memory double for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use slotty_core::config::CalendarConfig;
use slotty_core::domain::slot::BusyInterval;
use slotty_core::errors::UpstreamError;

/// The calendar surface the orchestrator depends on. Implementations must be
/// safe to share across request handlers.
#[async_trait]
pub trait CalendarClient: Send + Sync {
    /// Busy intervals that intersect `[time_min, time_max)`, expanded to
    /// single events and ordered by start time.
    async fn list_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, UpstreamError>;

    /// Creates an event and returns the backend's event identifier.
    async fn create_event(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        summary: &str,
    ) -> Result<String, UpstreamError>;
}

/// Client for a Google-Calendar-shaped events API.
pub struct HttpCalendarClient {
    client: Client,
    base_url: String,
    calendar_id: String,
    api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventListResource {
    #[serde(default)]
    items: Vec<EventResource>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EventResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    start: EventTime,
    end: EventTime,
}

/// Timed events carry `dateTime`; all-day events carry `date` only.
#[derive(Debug, Default, Serialize, Deserialize)]
struct EventTime {
    #[serde(rename = "dateTime", default, skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(rename = "timeZone", default, skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

impl EventTime {
    fn timed(instant: DateTime<Utc>) -> Self {
        Self {
            date_time: Some(instant.to_rfc3339()),
            date: None,
            time_zone: Some("UTC".to_string()),
        }
    }

    fn as_instant(&self) -> Option<DateTime<Utc>> {
        if let Some(raw) = &self.date_time {
            return DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc));
        }
        // All-day boundary, taken as UTC midnight.
        let date = self.date.as_deref()?.parse::<NaiveDate>().ok()?;
        Some(DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0)?, Utc))
    }
}

impl HttpCalendarClient {
    pub fn new(config: &CalendarConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| UpstreamError::Calendar(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            calendar_id: config.calendar_id.clone(),
            api_token: config.api_token.as_ref().map(|token| token.expose_secret().to_string()),
        })
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, self.calendar_id)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl CalendarClient for HttpCalendarClient {
    async fn list_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, UpstreamError> {
        let request = self
            .authorize(self.client.get(self.events_url()))
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ]);

        let response = request
            .send()
            .await
            .map_err(|err| UpstreamError::Calendar(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(event_name = "calendar.list_busy_failed", %status, "calendar list rejected");
            return Err(UpstreamError::Calendar(format!("event list returned {status}")));
        }

        let listing: EventListResource = response
            .json()
            .await
            .map_err(|err| UpstreamError::Calendar(format!("malformed event list: {err}")))?;

        let mut busy: Vec<BusyInterval> = listing
            .items
            .iter()
            .filter_map(|event| {
                let start = event.start.as_instant()?;
                let end = event.end.as_instant()?;
                (end > start).then_some(BusyInterval { start, end })
            })
            .collect();
        busy.sort_by_key(|interval| interval.start);

        debug!(
            event_name = "calendar.list_busy",
            events = listing.items.len(),
            busy = busy.len(),
            "fetched busy intervals"
        );
        Ok(busy)
    }

    async fn create_event(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        summary: &str,
    ) -> Result<String, UpstreamError> {
        let body = EventResource {
            id: None,
            summary: Some(summary.to_string()),
            start: EventTime::timed(start),
            end: EventTime::timed(end),
        };

        let response = self
            .authorize(self.client.post(self.events_url()))
            .json(&body)
            .send()
            .await
            .map_err(|err| UpstreamError::Calendar(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(event_name = "calendar.create_event_failed", %status, "event insert rejected");
            return Err(UpstreamError::Calendar(format!("event insert returned {status}")));
        }

        let created: EventResource = response
            .json()
            .await
            .map_err(|err| UpstreamError::Calendar(format!("malformed event resource: {err}")))?;

        let event_id = created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| UpstreamError::Calendar("event insert returned no id".to_string()))?;

        info!(event_name = "calendar.event_created", event_id = %event_id, "event created");
        Ok(event_id)
    }
}

/// In-memory calendar for tests and offline runs. Bookings become busy
/// intervals immediately, so a booked slot stops being offered.
#[derive(Default)]
pub struct StaticCalendar {
    inner: Mutex<StaticCalendarInner>,
}

#[derive(Default)]
struct StaticCalendarInner {
    busy: Vec<BusyInterval>,
    created: u64,
}

impl StaticCalendar {
    pub fn new(busy: Vec<BusyInterval>) -> Self {
        Self { inner: Mutex::new(StaticCalendarInner { busy, created: 0 }) }
    }

    pub fn busy_intervals(&self) -> Vec<BusyInterval> {
        self.inner.lock().map(|inner| inner.busy.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CalendarClient for StaticCalendar {
    async fn list_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, UpstreamError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| UpstreamError::Calendar("calendar state is poisoned".to_string()))?;

        let mut busy: Vec<BusyInterval> = inner
            .busy
            .iter()
            .filter(|interval| interval.overlaps(time_min, time_max))
            .cloned()
            .collect();
        busy.sort_by_key(|interval| interval.start);
        Ok(busy)
    }

    async fn create_event(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        _summary: &str,
    ) -> Result<String, UpstreamError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| UpstreamError::Calendar("calendar state is poisoned".to_string()))?;

        if end <= start {
            return Err(UpstreamError::Calendar("event end precedes start".to_string()));
        }

        inner.busy.push(BusyInterval { start, end });
        inner.created += 1;
        Ok(format!("evt-{}", inner.created))
    }
}
