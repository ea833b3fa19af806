use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

/// The only two moves out of `Pending`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaveDecision {
    Approved,
    Rejected,
}

impl From<LeaveDecision> for LeaveStatus {
    fn from(d: LeaveDecision) -> Self {
        match d {
            LeaveDecision::Approved => LeaveStatus::Approved,
            LeaveDecision::Rejected => LeaveStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1000,
    "leave_type_id": 2,
    "date_start": "2026-01-01",
    "date_end": "2026-01-03",
    "description": "family trip",
    "status": "pending",
    "requested_at": "2026-01-01T00:00:00Z",
    "decided_at": null,
    "decided_by": null
}))]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 2)]
    pub leave_type_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date_start: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub date_end: NaiveDate,
    pub description: String,
    pub status: LeaveStatus,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub requested_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub decided_at: Option<DateTime<Utc>>,
    /// user id of the approver
    pub decided_by: Option<u64>,
}

impl LeaveRequest {
    /// Inclusive range check.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.date_start <= date && date <= self.date_end
    }

    /// Number of calendar days in the inclusive range.
    pub fn days(&self) -> i64 {
        (self.date_end - self.date_start).num_days() + 1
    }
}

/// Validated input for a leave request that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub description: String,
    pub requested_at: DateTime<Utc>,
}

impl NewLeaveRequest {
    pub fn days(&self) -> i64 {
        (self.date_end - self.date_start).num_days() + 1
    }

    pub fn into_request(self, id: u64) -> LeaveRequest {
        LeaveRequest {
            id,
            employee_id: self.employee_id,
            leave_type_id: self.leave_type_id,
            date_start: self.date_start,
            date_end: self.date_end,
            description: self.description,
            status: LeaveStatus::Pending,
            requested_at: self.requested_at,
            decided_at: None,
            decided_by: None,
        }
    }
}

/// HR list filter; `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct LeaveQuery {
    pub employee_id: Option<u64>,
    pub status: Option<LeaveStatus>,
    pub limit: u64,
    pub offset: u64,
}
