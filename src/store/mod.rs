//! Storage seams for the attendance core.
//!
//! Each trait is one independent ledger. The aggregator is the only
//! component that reads more than one of them.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::StoreError;
use crate::model::attendance::{AttendanceEvent, AttendanceStatus, NewAttendanceEvent};
use crate::model::leave_request::{LeaveQuery, LeaveRequest, LeaveStatus, NewLeaveRequest};
use crate::model::schedule::ScheduleConfig;

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Holder of the single schedule record.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn load(&self) -> Result<Option<ScheduleConfig>, StoreError>;

    /// Replaces the record in one write.
    async fn save(&self, config: &ScheduleConfig) -> Result<(), StoreError>;
}

/// Append-only attendance events.
#[async_trait]
pub trait AttendanceLedger: Send + Sync {
    /// Inserts the event. Must fail with [`StoreError::Duplicate`] when an
    /// event of the same type already exists for the employee on that date,
    /// atomically with the insert.
    async fn append(&self, event: NewAttendanceEvent) -> Result<AttendanceEvent, StoreError>;

    /// Chronological.
    async fn events_for_employee_on_date(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceEvent>, StoreError>;

    /// Chronological, both ends inclusive.
    async fn events_for_employee_between(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceEvent>, StoreError>;

    async fn check_in_employees_on_date(&self, date: NaiveDate) -> Result<HashSet<u64>, StoreError>;

    async fn check_in_count_on_date(&self, date: NaiveDate) -> Result<u64, StoreError> {
        Ok(self.check_in_employees_on_date(date).await?.len() as u64)
    }

    /// Counts check-in events only.
    async fn status_counts_on_date(
        &self,
        date: NaiveDate,
    ) -> Result<HashMap<AttendanceStatus, u64>, StoreError>;
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn insert(&self, request: NewLeaveRequest) -> Result<LeaveRequest, StoreError>;

    async fn get(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError>;

    /// Moves a pending request to `status`. Returns `false` without writing
    /// when the request is missing or no longer pending.
    async fn transition_from_pending(
        &self,
        id: u64,
        status: LeaveStatus,
        decided_by: u64,
        decided_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Newest first.
    async fn for_employee(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, StoreError>;

    /// One page plus the total number of matches.
    async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, u64), StoreError>;

    async fn approved_employees_covering(&self, date: NaiveDate) -> Result<HashSet<u64>, StoreError>;

    /// Pending and approved requests of one type overlapping `[from, to]`.
    async fn open_requests_overlapping(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, StoreError>;
}

/// Read-only view of the employee roster owned by another service.
#[async_trait]
pub trait Roster: Send + Sync {
    async fn active_employee_count(&self) -> Result<u64, StoreError>;

    async fn employee_exists(&self, employee_id: u64) -> Result<bool, StoreError>;

    async fn leave_type_exists(&self, leave_type_id: u64) -> Result<bool, StoreError>;
}
