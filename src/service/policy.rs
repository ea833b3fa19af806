//! Pluggable validation of new leave requests against the schedule's
//! annual quotas.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};

use crate::error::{AttendanceError, Result};
use crate::model::leave_request::NewLeaveRequest;
use crate::model::schedule::ScheduleConfig;
use crate::store::LeaveStore;

#[async_trait]
pub trait LeavePolicy: Send + Sync {
    async fn check(&self, request: &NewLeaveRequest, schedule: Option<&ScheduleConfig>) -> Result<()>;
}

/// Accepts every request regardless of remaining balance.
pub struct Unrestricted;

#[async_trait]
impl LeavePolicy for Unrestricted {
    async fn check(&self, _request: &NewLeaveRequest, _schedule: Option<&ScheduleConfig>) -> Result<()> {
        Ok(())
    }
}

/// Rejects a request that would push pending plus approved days of its
/// leave type over the yearly quota, per calendar year the request touches.
/// Leave types without a quota entry are unlimited.
///
/// Best-effort: usage is read before the insert and nothing holds it in
/// between, so two requests submitted at the same moment can both pass.
pub struct AnnualQuota {
    store: Arc<dyn LeaveStore>,
}

impl AnnualQuota {
    pub fn new(store: Arc<dyn LeaveStore>) -> Self {
        Self { store }
    }
}

/// Days of `[start, end]` that fall inside `[from, to]`.
fn overlap_days(start: NaiveDate, end: NaiveDate, from: NaiveDate, to: NaiveDate) -> i64 {
    let lo = start.max(from);
    let hi = end.min(to);
    if hi < lo { 0 } else { (hi - lo).num_days() + 1 }
}

#[async_trait]
impl LeavePolicy for AnnualQuota {
    async fn check(&self, request: &NewLeaveRequest, schedule: Option<&ScheduleConfig>) -> Result<()> {
        let quota = match schedule.and_then(|s| s.quota_for(request.leave_type_id)) {
            Some(q) => i64::from(q),
            None => return Ok(()),
        };

        for year in request.date_start.year()..=request.date_end.year() {
            let (Some(from), Some(to)) = (
                NaiveDate::from_ymd_opt(year, 1, 1),
                NaiveDate::from_ymd_opt(year, 12, 31),
            ) else {
                continue;
            };

            let used: i64 = self
                .store
                .open_requests_overlapping(request.employee_id, request.leave_type_id, from, to)
                .await?
                .iter()
                .map(|r| overlap_days(r.date_start, r.date_end, from, to))
                .sum();
            let requested = overlap_days(request.date_start, request.date_end, from, to);

            if used + requested > quota {
                return Err(AttendanceError::QuotaExceeded {
                    leave_type_id: request.leave_type_id,
                    requested,
                    remaining: (quota - used).max(0),
                });
            }
        }

        Ok(())
    }
}
