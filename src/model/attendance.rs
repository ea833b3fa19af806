use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    CheckIn,
    CheckOut,
}

/// Status resolved once at write time. `Early` only occurs on check-out.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    OnTime,
    Late,
    Early,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1000,
    "event_type": "check_in",
    "timestamp": "2026-01-05T08:58:12",
    "status": "on_time"
}))]
pub struct AttendanceEvent {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    pub event_type: EventType,
    /// Company local time of the event
    #[schema(example = "2026-01-05T08:58:12", format = "date-time", value_type = String)]
    pub timestamp: NaiveDateTime,
    pub status: AttendanceStatus,
}

impl AttendanceEvent {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// An event that has not been assigned an id by the ledger yet.
#[derive(Debug, Clone)]
pub struct NewAttendanceEvent {
    pub employee_id: u64,
    pub event_type: EventType,
    pub timestamp: NaiveDateTime,
    pub status: AttendanceStatus,
}

impl NewAttendanceEvent {
    pub fn into_event(self, id: u64) -> AttendanceEvent {
        AttendanceEvent {
            id,
            employee_id: self.employee_id,
            event_type: self.event_type,
            timestamp: self.timestamp,
            status: self.status,
        }
    }
}

/// Today's events for one employee plus the derived flags.
#[derive(Debug, Serialize, ToSchema)]
pub struct TodayAttendance {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub events: Vec<AttendanceEvent>,
    pub has_checked_in: bool,
    pub has_checked_out: bool,
}

impl TodayAttendance {
    pub fn from_events(date: NaiveDate, events: Vec<AttendanceEvent>) -> Self {
        let has_checked_in = events.iter().any(|e| e.event_type == EventType::CheckIn);
        let has_checked_out = events.iter().any(|e| e.event_type == EventType::CheckOut);
        Self {
            date,
            events,
            has_checked_in,
            has_checked_out,
        }
    }
}
