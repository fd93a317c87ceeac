//! Calendar widget adapter: reservations as calendar events, plus the
//! date-click prefill and event-click detail text.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use thiserror::Error;

use park_api_client::{ApiError, Reservation, ReservationApi, ReservationId, ReservationStatus};

pub const EXCLUSIVE_COLOR: &str = "#dc3545";
pub const PENDING_COLOR: &str = "#ffc107";
pub const DEFAULT_COLOR: &str = "#007bff";

/// Hour a clicked future date starts at.
pub const DEFAULT_START_HOUR: u32 = 9;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("予約情報の取得に失敗しました。")]
    Fetch(#[source] ApiError),
}

/// One event in the shape the calendar widget consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: ReservationId,
    pub title: String,
    pub start: String,
    pub end: String,
    pub background_color: &'static str,
    pub border_color: &'static str,
    pub extended_props: EventDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDetails {
    pub status: ReservationStatus,
    pub purpose: String,
    pub park_name: Option<String>,
}

/// Exclusive use wins over pending.
pub fn event_color(reservation: &Reservation) -> &'static str {
    if reservation.is_exclusive {
        EXCLUSIVE_COLOR
    } else if reservation.status == ReservationStatus::Pending {
        PENDING_COLOR
    } else {
        DEFAULT_COLOR
    }
}

impl From<&Reservation> for CalendarEvent {
    fn from(reservation: &Reservation) -> Self {
        let park = reservation.park_name.as_deref().unwrap_or("");
        let mut title = format!("{} @ {}", reservation.organization_name, park);
        if reservation.is_exclusive {
            title.push_str(" (占用)");
        }
        let color = event_color(reservation);

        Self {
            id: reservation.id,
            title,
            start: reservation.start_datetime.clone(),
            end: reservation.end_datetime.clone(),
            background_color: color,
            border_color: color,
            extended_props: EventDetails {
                status: reservation.status,
                purpose: reservation.purpose.clone(),
                park_name: reservation.park_name.clone(),
            },
        }
    }
}

/// What the calendar widget calls whenever it needs events. Each call is an
/// independent fetch; there is no cancellation of an in-flight call.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn events(&self) -> Result<Vec<CalendarEvent>, CalendarError>;
}

/// Event source backed by `GET /api/reservations`.
#[derive(Clone)]
pub struct ReservationEventSource {
    api: Arc<dyn ReservationApi>,
}

impl ReservationEventSource {
    pub fn new(api: Arc<dyn ReservationApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl EventSource for ReservationEventSource {
    async fn events(&self) -> Result<Vec<CalendarEvent>, CalendarError> {
        match self.api.list_reservations().await {
            Ok(reservations) => Ok(reservations.iter().map(CalendarEvent::from).collect()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch reservations for calendar");
                Err(CalendarError::Fetch(e))
            }
        }
    }
}

/// Start value for a clicked date: 09:00, or the current time when the
/// clicked date is today and 09:00 has already come.
pub fn start_for_clicked_date(date: NaiveDate, now: NaiveDateTime) -> String {
    let (hour, minute) = if date == now.date() && now.hour() >= DEFAULT_START_HOUR {
        (now.hour(), now.minute())
    } else {
        (DEFAULT_START_HOUR, 0)
    };
    format!("{}T{:02}:{:02}", date.format("%Y-%m-%d"), hour, minute)
}

/// Text shown when an event is clicked.
pub fn event_details(event: &CalendarEvent) -> String {
    format!(
        "予約詳細:\nタイトル: {}\n目的: {}\nステータス: {}\n公園: {}",
        event.title,
        event.extended_props.purpose,
        event.extended_props.status,
        event.extended_props.park_name.as_deref().unwrap_or(""),
    )
}
