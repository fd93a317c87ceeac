use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

pub type ReservationId = i64;
pub type ParkId = i64;

// --- Reservations ---

/// Lifecycle state of a reservation. Transition rules live server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    CancelledByAdmin,
    Completed,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 6] = [
        ReservationStatus::Pending,
        ReservationStatus::Approved,
        ReservationStatus::Rejected,
        ReservationStatus::Cancelled,
        ReservationStatus::CancelledByAdmin,
        ReservationStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Approved => "approved",
            ReservationStatus::Rejected => "rejected",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::CancelledByAdmin => "cancelled_by_admin",
            ReservationStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown reservation status: {s}"))
    }
}

/// A reservation row as returned by `GET /api/reservations[/:id]`.
///
/// Datetimes are kept as the strings the API stores; formatting and parsing
/// happen in the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub organization_name: String,
    #[serde(default)]
    pub park_name: Option<String>,
    pub start_datetime: String,
    pub end_datetime: String,
    pub purpose: String,
    #[serde(default)]
    pub grade: Option<String>,
    pub number_of_people: i64,
    pub contact_info: String,
    #[serde(deserialize_with = "exclusive_flag")]
    pub is_exclusive: bool,
    pub status: ReservationStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// The API stores `is_exclusive` as 0/1 but older rows may carry a JSON bool.
fn exclusive_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Int(i64),
        Bool(bool),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Int(n) => n != 0,
        Flag::Bool(b) => b,
    })
}

/// Body for `POST /api/reservations` and `PUT /api/reservations/:id`.
///
/// Numeric fields are `None` when the form value did not parse as an
/// integer; they serialize as `null` and the API rejects them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationInput {
    pub park_name: String,
    pub start_datetime: String,
    pub end_datetime: String,
    pub is_exclusive: Option<i64>,
    pub purpose: String,
    pub organization_name: String,
    pub grade: Option<String>,
    pub number_of_people: Option<i64>,
    pub contact_info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
}

/// Response to a successful reservation create.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedReservation {
    #[serde(default)]
    pub id: Option<ReservationId>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reservation: Option<Reservation>,
}

/// Response to a successful status transition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusChange {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reservation: Option<Reservation>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatusUpdate {
    pub status: ReservationStatus,
}

// --- Parks ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Park {
    pub id: ParkId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ParkName<'a> {
    pub name: &'a str,
}

/// Response to a successful park create or rename.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParkMutation {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub park: Option<Park>,
}

// --- Admin session ---

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Generic acknowledgement carrying only a message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

// --- Envelope ---

/// The fields every API answer may carry next to its payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}
