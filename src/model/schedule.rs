use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AttendanceError;

/// The company-wide work-hour policy. One active record exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "start_work": "09:00:00",
    "end_work": "18:00:00",
    "late_tolerance_minutes": 10,
    "leave_quotas": { "1": 14, "2": 10 },
    "work_days": ["Mon", "Tue", "Wed", "Thu", "Fri"]
}))]
pub struct ScheduleConfig {
    #[schema(example = "09:00:00", value_type = String)]
    pub start_work: NaiveTime,
    #[schema(example = "18:00:00", value_type = String)]
    pub end_work: NaiveTime,
    /// Grace period after `start_work` still counted as on time
    pub late_tolerance_minutes: u32,
    /// leave type id -> days per year
    #[schema(value_type = Object)]
    pub leave_quotas: BTreeMap<u64, u32>,
    #[schema(value_type = Vec<String>)]
    pub work_days: Vec<Weekday>,
}

impl ScheduleConfig {
    pub fn is_work_day(&self, date: NaiveDate) -> bool {
        self.work_days.contains(&date.weekday())
    }

    pub fn quota_for(&self, leave_type_id: u64) -> Option<u32> {
        self.leave_quotas.get(&leave_type_id).copied()
    }
}

/// Administrator input for replacing the schedule. Signed fields so that
/// negative values reach validation instead of failing deserialization.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ScheduleUpdate {
    #[schema(example = "09:00:00", value_type = String)]
    pub start_work: NaiveTime,
    #[schema(example = "18:00:00", value_type = String)]
    pub end_work: NaiveTime,
    #[schema(example = 10)]
    pub late_tolerance_minutes: i64,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub leave_quotas: BTreeMap<u64, i64>,
    #[schema(value_type = Vec<String>, example = json!(["Mon", "Tue", "Wed", "Thu", "Fri"]))]
    pub work_days: Vec<Weekday>,
}

impl ScheduleUpdate {
    pub fn validate(self) -> Result<ScheduleConfig, AttendanceError> {
        if self.start_work >= self.end_work {
            return Err(AttendanceError::InvalidSchedule(
                "start_work must be before end_work".into(),
            ));
        }

        let late_tolerance_minutes = u32::try_from(self.late_tolerance_minutes).map_err(|_| {
            AttendanceError::InvalidSchedule("late_tolerance_minutes must be >= 0".into())
        })?;

        let mut leave_quotas = BTreeMap::new();
        for (leave_type_id, days) in self.leave_quotas {
            let days = u32::try_from(days).map_err(|_| {
                AttendanceError::InvalidSchedule(format!(
                    "quota for leave type {} must be >= 0",
                    leave_type_id
                ))
            })?;
            leave_quotas.insert(leave_type_id, days);
        }

        let mut work_days = self.work_days;
        work_days.sort_by_key(|d| d.num_days_from_monday());
        work_days.dedup();
        if work_days.is_empty() {
            return Err(AttendanceError::InvalidSchedule(
                "at least one work day is required".into(),
            ));
        }

        Ok(ScheduleConfig {
            start_work: self.start_work,
            end_work: self.end_work,
            late_tolerance_minutes,
            leave_quotas,
            work_days,
        })
    }
}
