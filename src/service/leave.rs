use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, instrument};

use super::policy::LeavePolicy;
use super::schedule::ScheduleService;
use crate::error::{AttendanceError, Result};
use crate::model::leave_request::{LeaveDecision, LeaveQuery, LeaveRequest, NewLeaveRequest};
use crate::store::{LeaveStore, Roster};

/// Employee input for a new leave request.
#[derive(Debug, Clone)]
pub struct LeaveApplication {
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub description: String,
}

/// Pending -> Approved | Rejected, once.
#[derive(Clone)]
pub struct LeaveLifecycle {
    store: Arc<dyn LeaveStore>,
    roster: Arc<dyn Roster>,
    schedule: ScheduleService,
    policy: Arc<dyn LeavePolicy>,
}

impl LeaveLifecycle {
    pub fn new(
        store: Arc<dyn LeaveStore>,
        roster: Arc<dyn Roster>,
        schedule: ScheduleService,
        policy: Arc<dyn LeavePolicy>,
    ) -> Self {
        Self {
            store,
            roster,
            schedule,
            policy,
        }
    }

    #[instrument(name = "leave_create", skip(self, application), fields(employee_id = application.employee_id))]
    pub async fn create(&self, application: LeaveApplication, now: DateTime<Utc>) -> Result<LeaveRequest> {
        if application.date_end < application.date_start {
            return Err(AttendanceError::InvalidDateRange);
        }
        if !self.roster.employee_exists(application.employee_id).await? {
            return Err(AttendanceError::UnknownEmployee(application.employee_id));
        }
        if !self.roster.leave_type_exists(application.leave_type_id).await? {
            return Err(AttendanceError::UnknownLeaveType(application.leave_type_id));
        }

        let request = NewLeaveRequest {
            employee_id: application.employee_id,
            leave_type_id: application.leave_type_id,
            date_start: application.date_start,
            date_end: application.date_end,
            description: application.description,
            requested_at: now,
        };

        // quotas are advisory when no schedule exists yet
        let schedule = match self.schedule.get().await {
            Ok(config) => Some(config),
            Err(AttendanceError::ConfigMissing) => None,
            Err(e) => return Err(e),
        };
        self.policy.check(&request, schedule.as_ref()).await?;

        let stored = self.store.insert(request).await?;
        info!(leave_id = stored.id, days = stored.days(), "Leave request submitted");
        Ok(stored)
    }

    #[instrument(name = "leave_decide", skip(self))]
    pub async fn decide(
        &self,
        request_id: u64,
        decision: LeaveDecision,
        decided_by: u64,
        now: DateTime<Utc>,
    ) -> Result<LeaveRequest> {
        if self.get(request_id).await?.status.is_terminal() {
            return Err(AttendanceError::AlreadyDecided(request_id));
        }

        // a concurrent decider may still win between the read and this write
        let moved = self
            .store
            .transition_from_pending(request_id, decision.into(), decided_by, now)
            .await?;
        if !moved {
            return Err(AttendanceError::AlreadyDecided(request_id));
        }

        let request = self.get(request_id).await?;

        info!(leave_id = request_id, status = %request.status, "Leave request decided");
        Ok(request)
    }

    pub async fn get(&self, request_id: u64) -> Result<LeaveRequest> {
        self.store
            .get(request_id)
            .await?
            .ok_or(AttendanceError::LeaveRequestNotFound(request_id))
    }

    pub async fn for_employee(&self, employee_id: u64) -> Result<Vec<LeaveRequest>> {
        Ok(self.store.for_employee(employee_id).await?)
    }

    pub async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, u64)> {
        Ok(self.store.list(query).await?)
    }

    pub async fn approved_leave_covering_date(&self, date: NaiveDate) -> Result<HashSet<u64>> {
        Ok(self.store.approved_employees_covering(date).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::LeaveStatus;
    use crate::service::policy::{AnnualQuota, Unrestricted};
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn lifecycle(store: Arc<MemoryStore>) -> LeaveLifecycle {
        let schedule = ScheduleService::new(store.clone(), Duration::from_secs(60));
        LeaveLifecycle::new(store.clone(), store, schedule, Arc::new(Unrestricted))
    }

    fn application(employee_id: u64, start: NaiveDate, end: NaiveDate) -> LeaveApplication {
        LeaveApplication {
            employee_id,
            leave_type_id: 1,
            date_start: start,
            date_end: end,
            description: "annual leave".into(),
        }
    }

    fn roster() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new().with_employees(1..=3).with_leave_types([1, 2]))
    }

    #[actix_web::test]
    async fn create_starts_pending() {
        let leave = lifecycle(roster());
        let request = leave
            .create(application(1, date(3, 2), date(3, 3)), Utc::now())
            .await
            .unwrap();
        assert_eq!(request.status, LeaveStatus::Pending);
        assert_eq!(request.decided_at, None);
    }

    #[actix_web::test]
    async fn reversed_range_is_invalid() {
        let leave = lifecycle(roster());
        let err = leave
            .create(application(1, date(3, 3), date(3, 2)), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidDateRange));
    }

    #[actix_web::test]
    async fn unknown_employee_and_leave_type_are_rejected() {
        let leave = lifecycle(roster());
        let err = leave
            .create(application(42, date(3, 2), date(3, 2)), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::UnknownEmployee(42)));

        let mut app = application(1, date(3, 2), date(3, 2));
        app.leave_type_id = 9;
        let err = leave.create(app, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AttendanceError::UnknownLeaveType(9)));
    }

    #[actix_web::test]
    async fn decide_is_one_way() {
        let leave = lifecycle(roster());
        let request = leave
            .create(application(1, date(3, 2), date(3, 3)), Utc::now())
            .await
            .unwrap();

        let approved = leave
            .decide(request.id, LeaveDecision::Approved, 100, Utc::now())
            .await
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.decided_by, Some(100));

        for decision in [LeaveDecision::Rejected, LeaveDecision::Approved] {
            let err = leave
                .decide(request.id, decision, 100, Utc::now())
                .await
                .unwrap_err();
            assert!(matches!(err, AttendanceError::AlreadyDecided(_)));
        }
        assert_eq!(leave.get(request.id).await.unwrap().status, LeaveStatus::Approved);
    }

    #[actix_web::test]
    async fn decide_unknown_request_is_not_found() {
        let leave = lifecycle(roster());
        let err = leave
            .decide(77, LeaveDecision::Rejected, 100, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::LeaveRequestNotFound(77)));
    }

    #[actix_web::test]
    async fn only_approved_leave_covers_dates() {
        let leave = lifecycle(roster());
        let approved = leave
            .create(application(1, date(3, 2), date(3, 4)), Utc::now())
            .await
            .unwrap();
        let rejected = leave
            .create(application(2, date(3, 2), date(3, 4)), Utc::now())
            .await
            .unwrap();
        leave
            .create(application(3, date(3, 2), date(3, 4)), Utc::now())
            .await
            .unwrap();

        leave
            .decide(approved.id, LeaveDecision::Approved, 100, Utc::now())
            .await
            .unwrap();
        leave
            .decide(rejected.id, LeaveDecision::Rejected, 100, Utc::now())
            .await
            .unwrap();

        let covered = leave.approved_leave_covering_date(date(3, 4)).await.unwrap();
        assert_eq!(covered, HashSet::from([1]));
        assert!(leave.approved_leave_covering_date(date(3, 5)).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn quota_policy_plugs_in_without_changing_lifecycle() {
        let store = roster();
        let schedule = ScheduleService::new(store.clone(), Duration::from_secs(60));
        schedule
            .update(crate::model::schedule::ScheduleUpdate {
                start_work: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_work: chrono::NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                late_tolerance_minutes: 0,
                leave_quotas: [(1, 2)].into_iter().collect(),
                work_days: vec![chrono::Weekday::Mon],
            })
            .await
            .unwrap();
        let leave = LeaveLifecycle::new(
            store.clone(),
            store.clone(),
            schedule,
            Arc::new(AnnualQuota::new(store)),
        );

        leave
            .create(application(1, date(3, 2), date(3, 3)), Utc::now())
            .await
            .unwrap();
        let err = leave
            .create(application(1, date(4, 1), date(4, 1)), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::QuotaExceeded { .. }));
    }

    #[actix_web::test]
    async fn my_requests_are_newest_first() {
        let leave = lifecycle(roster());
        let earlier = Utc::now() - chrono::Duration::hours(1);
        let first = leave
            .create(application(1, date(3, 2), date(3, 2)), earlier)
            .await
            .unwrap();
        let second = leave
            .create(application(1, date(4, 2), date(4, 2)), Utc::now())
            .await
            .unwrap();
        leave
            .create(application(2, date(4, 2), date(4, 2)), Utc::now())
            .await
            .unwrap();

        let mine = leave.for_employee(1).await.unwrap();
        let ids: Vec<_> = mine.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}
