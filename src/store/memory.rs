//! In-process implementation of every store trait, used by tests and
//! for running the service without a database.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::{AttendanceLedger, LeaveStore, Roster, ScheduleStore};
use crate::error::StoreError;
use crate::model::attendance::{AttendanceEvent, AttendanceStatus, EventType, NewAttendanceEvent};
use crate::model::leave_request::{LeaveQuery, LeaveRequest, LeaveStatus, NewLeaveRequest};
use crate::model::schedule::ScheduleConfig;

#[derive(Default)]
struct Inner {
    schedule: Option<ScheduleConfig>,
    events: Vec<AttendanceEvent>,
    leave_requests: Vec<LeaveRequest>,
    employees: BTreeSet<u64>,
    leave_types: BTreeSet<u64>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.lock_unpoisoned().employees.extend(ids);
        self
    }

    pub fn with_leave_types(self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.lock_unpoisoned().leave_types.extend(ids);
        self
    }

    pub fn with_schedule(self, config: ScheduleConfig) -> Self {
        self.lock_unpoisoned().schedule = Some(config);
        self
    }

    fn lock_unpoisoned(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn load(&self) -> Result<Option<ScheduleConfig>, StoreError> {
        Ok(self.lock()?.schedule.clone())
    }

    async fn save(&self, config: &ScheduleConfig) -> Result<(), StoreError> {
        self.lock()?.schedule = Some(config.clone());
        Ok(())
    }
}

#[async_trait]
impl AttendanceLedger for MemoryStore {
    async fn append(&self, event: NewAttendanceEvent) -> Result<AttendanceEvent, StoreError> {
        // existence check and push happen under one lock
        let mut inner = self.lock()?;
        let date = event.timestamp.date();
        let taken = inner.events.iter().any(|e| {
            e.employee_id == event.employee_id && e.event_type == event.event_type && e.date() == date
        });
        if taken {
            return Err(StoreError::Duplicate);
        }

        let id = inner.events.len() as u64 + 1;
        let stored = event.into_event(id);
        inner.events.push(stored.clone());
        Ok(stored)
    }

    async fn events_for_employee_on_date(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        self.events_for_employee_between(employee_id, date, date).await
    }

    async fn events_for_employee_between(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let inner = self.lock()?;
        let mut events: Vec<_> = inner
            .events
            .iter()
            .filter(|e| e.employee_id == employee_id && from <= e.date() && e.date() <= to)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.timestamp, e.id));
        Ok(events)
    }

    async fn check_in_employees_on_date(&self, date: NaiveDate) -> Result<HashSet<u64>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .events
            .iter()
            .filter(|e| e.event_type == EventType::CheckIn && e.date() == date)
            .map(|e| e.employee_id)
            .collect())
    }

    async fn status_counts_on_date(
        &self,
        date: NaiveDate,
    ) -> Result<HashMap<AttendanceStatus, u64>, StoreError> {
        let inner = self.lock()?;
        let mut counts = HashMap::new();
        for e in inner
            .events
            .iter()
            .filter(|e| e.event_type == EventType::CheckIn && e.date() == date)
        {
            *counts.entry(e.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn insert(&self, request: NewLeaveRequest) -> Result<LeaveRequest, StoreError> {
        let mut inner = self.lock()?;
        let id = inner.leave_requests.len() as u64 + 1;
        let stored = request.into_request(id);
        inner.leave_requests.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        Ok(self.lock()?.leave_requests.iter().find(|r| r.id == id).cloned())
    }

    async fn transition_from_pending(
        &self,
        id: u64,
        status: LeaveStatus,
        decided_by: u64,
        decided_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        match inner
            .leave_requests
            .iter_mut()
            .find(|r| r.id == id && r.status == LeaveStatus::Pending)
        {
            Some(request) => {
                request.status = status;
                request.decided_by = Some(decided_by);
                request.decided_at = Some(decided_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn for_employee(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, StoreError> {
        let inner = self.lock()?;
        let mut requests: Vec<_> = inner
            .leave_requests
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at).then(b.id.cmp(&a.id)));
        Ok(requests)
    }

    async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, u64), StoreError> {
        let inner = self.lock()?;
        let mut matches: Vec<_> = inner
            .leave_requests
            .iter()
            .filter(|r| query.employee_id.is_none_or(|id| r.employee_id == id))
            .filter(|r| query.status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.requested_at.cmp(&a.requested_at).then(b.id.cmp(&a.id)));

        let total = matches.len() as u64;
        let page = matches
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn approved_employees_covering(&self, date: NaiveDate) -> Result<HashSet<u64>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .leave_requests
            .iter()
            .filter(|r| r.status == LeaveStatus::Approved && r.covers(date))
            .map(|r| r.employee_id)
            .collect())
    }

    async fn open_requests_overlapping(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .leave_requests
            .iter()
            .filter(|r| {
                r.employee_id == employee_id
                    && r.leave_type_id == leave_type_id
                    && r.status != LeaveStatus::Rejected
                    && r.date_start <= to
                    && r.date_end >= from
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Roster for MemoryStore {
    async fn active_employee_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.employees.len() as u64)
    }

    async fn employee_exists(&self, employee_id: u64) -> Result<bool, StoreError> {
        Ok(self.lock()?.employees.contains(&employee_id))
    }

    async fn leave_type_exists(&self, leave_type_id: u64) -> Result<bool, StoreError> {
        Ok(self.lock()?.leave_types.contains(&leave_type_id))
    }
}
