use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// Company-wide counts for one date. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(example = json!({
    "date": "2026-01-05",
    "work_day": true,
    "total_employees": 10,
    "checked_in_count": 6,
    "on_leave_count": 1,
    "on_time_count": 4,
    "late_count": 2,
    "absent_count": 3
}))]
pub struct DailySummarySnapshot {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub work_day: bool,
    pub total_employees: u64,
    pub checked_in_count: u64,
    /// Employees on approved leave who did not check in
    pub on_leave_count: u64,
    pub on_time_count: u64,
    pub late_count: u64,
    pub absent_count: u64,
}
