use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, instrument, warn};

use super::schedule::ScheduleService;
use super::status;
use crate::error::{AttendanceError, Result, StoreError};
use crate::model::attendance::{AttendanceEvent, EventType, NewAttendanceEvent, TodayAttendance};
use crate::store::AttendanceLedger;

/// Writes check-in and check-out events, one of each per employee per day.
#[derive(Clone)]
pub struct AttendanceRecorder {
    schedule: ScheduleService,
    ledger: Arc<dyn AttendanceLedger>,
}

impl AttendanceRecorder {
    pub fn new(schedule: ScheduleService, ledger: Arc<dyn AttendanceLedger>) -> Self {
        Self { schedule, ledger }
    }

    #[instrument(name = "attendance_check_in", skip(self))]
    pub async fn check_in(&self, employee_id: u64, now: NaiveDateTime) -> Result<AttendanceEvent> {
        let today = self
            .ledger
            .events_for_employee_on_date(employee_id, now.date())
            .await?;
        if today.iter().any(|e| e.event_type == EventType::CheckIn) {
            return Err(AttendanceError::AlreadyCheckedIn);
        }

        let config = self.schedule.get().await?;
        let event = NewAttendanceEvent {
            employee_id,
            event_type: EventType::CheckIn,
            timestamp: now,
            status: status::resolve(&config, EventType::CheckIn, now),
        };

        self.append(event, AttendanceError::AlreadyCheckedIn).await
    }

    #[instrument(name = "attendance_check_out", skip(self))]
    pub async fn check_out(&self, employee_id: u64, now: NaiveDateTime) -> Result<AttendanceEvent> {
        let today = self
            .ledger
            .events_for_employee_on_date(employee_id, now.date())
            .await?;
        if !today.iter().any(|e| e.event_type == EventType::CheckIn) {
            return Err(AttendanceError::NotCheckedInYet);
        }
        if today.iter().any(|e| e.event_type == EventType::CheckOut) {
            return Err(AttendanceError::AlreadyCheckedOut);
        }

        let config = self.schedule.get().await?;
        let event = NewAttendanceEvent {
            employee_id,
            event_type: EventType::CheckOut,
            timestamp: now,
            status: status::resolve(&config, EventType::CheckOut, now),
        };

        self.append(event, AttendanceError::AlreadyCheckedOut).await
    }

    pub async fn today(&self, employee_id: u64, now: NaiveDateTime) -> Result<TodayAttendance> {
        let date = now.date();
        let events = self.ledger.events_for_employee_on_date(employee_id, date).await?;
        Ok(TodayAttendance::from_events(date, events))
    }

    pub async fn history(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceEvent>> {
        if to < from {
            return Err(AttendanceError::InvalidDateRange);
        }
        Ok(self
            .ledger
            .events_for_employee_between(employee_id, from, to)
            .await?)
    }

    /// A concurrent request that won the race shows up here as a duplicate.
    async fn append(
        &self,
        event: NewAttendanceEvent,
        on_duplicate: AttendanceError,
    ) -> Result<AttendanceEvent> {
        match self.ledger.append(event).await {
            Ok(stored) => {
                info!(
                    event_id = stored.id,
                    event_type = %stored.event_type,
                    status = %stored.status,
                    "Attendance recorded"
                );
                Ok(stored)
            }
            Err(StoreError::Duplicate) => {
                warn!(error = %on_duplicate, "Duplicate attendance write rejected by ledger");
                Err(on_duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }
}
