use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use super::leave::LeaveLifecycle;
use super::schedule::ScheduleService;
use crate::error::Result;
use crate::model::attendance::AttendanceStatus;
use crate::model::summary::DailySummarySnapshot;
use crate::store::{AttendanceLedger, Roster};

/// Joins the attendance ledger and the leave ledger against the roster size.
/// The two ledgers are read independently, so the snapshot is a
/// best-effort point-in-time view.
#[derive(Clone)]
pub struct DailySummaryAggregator {
    schedule: ScheduleService,
    ledger: Arc<dyn AttendanceLedger>,
    leave: LeaveLifecycle,
    roster: Arc<dyn Roster>,
}

impl DailySummaryAggregator {
    pub fn new(
        schedule: ScheduleService,
        ledger: Arc<dyn AttendanceLedger>,
        leave: LeaveLifecycle,
        roster: Arc<dyn Roster>,
    ) -> Self {
        Self {
            schedule,
            ledger,
            leave,
            roster,
        }
    }

    pub async fn summarize(&self, date: NaiveDate) -> Result<DailySummarySnapshot> {
        let config = self.schedule.get().await?;

        let status_counts = self.ledger.status_counts_on_date(date).await?;
        let on_time = status_counts.get(&AttendanceStatus::OnTime).copied().unwrap_or(0);
        let late = status_counts.get(&AttendanceStatus::Late).copied().unwrap_or(0);

        let checked_in = self.ledger.check_in_employees_on_date(date).await?;
        let checked_in_count = self.ledger.check_in_count_on_date(date).await?;

        // someone who checked in despite approved leave is present, not on leave
        let on_leave = self
            .leave
            .approved_leave_covering_date(date)
            .await?
            .difference(&checked_in)
            .count() as u64;

        let total = self.roster.active_employee_count().await?;
        let work_day = config.is_work_day(date);
        let absent = if work_day {
            total.saturating_sub(checked_in_count).saturating_sub(on_leave)
        } else {
            0
        };

        debug!(%date, total, checked_in = checked_in_count, on_leave, absent, "Daily summary computed");

        Ok(DailySummarySnapshot {
            date,
            work_day,
            total_employees: total,
            checked_in_count,
            on_leave_count: on_leave,
            on_time_count: on_time,
            late_count: late,
            absent_count: absent,
        })
    }
}
