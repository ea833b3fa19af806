use std::sync::Arc;
use std::time::Duration;

use crate::service::{
    AnnualQuota, AttendanceRecorder, DailySummaryAggregator, LeaveLifecycle, LeavePolicy,
    ScheduleService, Unrestricted,
};
use crate::store::{AttendanceLedger, LeaveStore, Roster, ScheduleStore};

/// Everything the handlers need, wired over one set of stores.
#[derive(Clone)]
pub struct AppState {
    pub schedule: ScheduleService,
    pub recorder: AttendanceRecorder,
    pub leave: LeaveLifecycle,
    pub summary: DailySummaryAggregator,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, schedule_ttl: Duration, enforce_leave_quotas: bool) -> Self
    where
        S: ScheduleStore + AttendanceLedger + LeaveStore + Roster + 'static,
    {
        let schedule = ScheduleService::new(store.clone(), schedule_ttl);

        let policy: Arc<dyn LeavePolicy> = if enforce_leave_quotas {
            Arc::new(AnnualQuota::new(store.clone()))
        } else {
            Arc::new(Unrestricted)
        };

        let leave = LeaveLifecycle::new(store.clone(), store.clone(), schedule.clone(), policy);
        let recorder = AttendanceRecorder::new(schedule.clone(), store.clone());
        let summary = DailySummaryAggregator::new(schedule.clone(), store.clone(), leave.clone(), store);

        Self {
            schedule,
            recorder,
            leave,
            summary,
        }
    }
}
