//! MySQL-backed stores.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use sqlx::{FromRow, MySqlPool};

use super::{AttendanceLedger, LeaveStore, Roster, ScheduleStore};
use crate::error::StoreError;
use crate::model::attendance::{AttendanceEvent, AttendanceStatus, EventType, NewAttendanceEvent};
use crate::model::leave_request::{LeaveQuery, LeaveRequest, LeaveStatus, NewLeaveRequest};
use crate::model::schedule::ScheduleConfig;

const SCHEDULE_ROW_ID: u8 = 1;

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn corrupt(what: &str, value: &str) -> StoreError {
    StoreError::Unavailable(format!("unreadable {} value '{}'", what, value))
}

#[derive(FromRow)]
struct ScheduleRow {
    start_work: NaiveTime,
    end_work: NaiveTime,
    late_tolerance_minutes: u32,
    leave_quotas: String,
    work_days: String,
}

impl TryFrom<ScheduleRow> for ScheduleConfig {
    type Error = StoreError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let leave_quotas = serde_json::from_str(&row.leave_quotas)
            .map_err(|_| corrupt("leave_quotas", &row.leave_quotas))?;
        let work_days = row
            .work_days
            .split(',')
            .filter(|d| !d.is_empty())
            .map(|d| Weekday::from_str(d.trim()).map_err(|_| corrupt("work_days", d)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScheduleConfig {
            start_work: row.start_work,
            end_work: row.end_work,
            late_tolerance_minutes: row.late_tolerance_minutes,
            leave_quotas,
            work_days,
        })
    }
}

#[derive(FromRow)]
struct EventRow {
    id: u64,
    employee_id: u64,
    event_type: String,
    event_time: NaiveDateTime,
    status: String,
}

impl TryFrom<EventRow> for AttendanceEvent {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(AttendanceEvent {
            id: row.id,
            employee_id: row.employee_id,
            event_type: EventType::from_str(&row.event_type)
                .map_err(|_| corrupt("event_type", &row.event_type))?,
            timestamp: row.event_time,
            status: AttendanceStatus::from_str(&row.status)
                .map_err(|_| corrupt("status", &row.status))?,
        })
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    employee_id: u64,
    leave_type_id: u64,
    date_start: NaiveDate,
    date_end: NaiveDate,
    description: String,
    status: String,
    requested_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
    decided_by: Option<u64>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        Ok(LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            leave_type_id: row.leave_type_id,
            date_start: row.date_start,
            date_end: row.date_end,
            description: row.description,
            status: LeaveStatus::from_str(&row.status).map_err(|_| corrupt("status", &row.status))?,
            requested_at: row.requested_at,
            decided_at: row.decided_at,
            decided_by: row.decided_by,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const EVENT_COLUMNS: &str = "id, employee_id, event_type, event_time, status";
const LEAVE_COLUMNS: &str = "id, employee_id, leave_type_id, date_start, date_end, description, \
                             status, requested_at, decided_at, decided_by";

#[async_trait]
impl ScheduleStore for MySqlStore {
    async fn load(&self) -> Result<Option<ScheduleConfig>, StoreError> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT start_work, end_work, late_tolerance_minutes, leave_quotas, work_days
            FROM schedule_config
            WHERE id = ?
            "#,
        )
        .bind(SCHEDULE_ROW_ID)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ScheduleConfig::try_from).transpose()
    }

    async fn save(&self, config: &ScheduleConfig) -> Result<(), StoreError> {
        let leave_quotas = serde_json::to_string(&config.leave_quotas)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let work_days = config
            .work_days
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",");

        sqlx::query(
            r#"
            INSERT INTO schedule_config
                (id, start_work, end_work, late_tolerance_minutes, leave_quotas, work_days)
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                start_work = VALUES(start_work),
                end_work = VALUES(end_work),
                late_tolerance_minutes = VALUES(late_tolerance_minutes),
                leave_quotas = VALUES(leave_quotas),
                work_days = VALUES(work_days)
            "#,
        )
        .bind(SCHEDULE_ROW_ID)
        .bind(config.start_work)
        .bind(config.end_work)
        .bind(config.late_tolerance_minutes)
        .bind(leave_quotas)
        .bind(work_days)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AttendanceLedger for MySqlStore {
    async fn append(&self, event: NewAttendanceEvent) -> Result<AttendanceEvent, StoreError> {
        // uq_attendance_employee_day_type turns a concurrent duplicate into 23000
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_events
                (employee_id, event_date, event_type, event_time, status)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.employee_id)
        .bind(event.timestamp.date())
        .bind(event.event_type.as_ref())
        .bind(event.timestamp)
        .bind(event.status.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(event.into_event(result.last_insert_id()))
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
        let sql = format!(
            r#"
            SELECT {}
            FROM attendance_events
            WHERE employee_id = ?
            AND event_date BETWEEN ? AND ?
            ORDER BY event_time, id
            "#,
            EVENT_COLUMNS
        );

        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(employee_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }

    async fn check_in_employees_on_date(&self, date: NaiveDate) -> Result<HashSet<u64>, StoreError> {
        let ids = sqlx::query_scalar::<_, u64>(
            r#"
            SELECT DISTINCT employee_id
            FROM attendance_events
            WHERE event_date = ?
            AND event_type = 'check_in'
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn check_in_count_on_date(&self, date: NaiveDate) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT employee_id)
            FROM attendance_events
            WHERE event_date = ?
            AND event_type = 'check_in'
            "#,
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn status_counts_on_date(
        &self,
        date: NaiveDate,
    ) -> Result<HashMap<AttendanceStatus, u64>, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM attendance_events
            WHERE event_date = ?
            AND event_type = 'check_in'
            GROUP BY status
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(status, count)| {
                let status = AttendanceStatus::from_str(&status).map_err(|_| corrupt("status", &status))?;
                Ok((status, count.max(0) as u64))
            })
            .collect()
    }
}

#[async_trait]
impl LeaveStore for MySqlStore {
    async fn insert(&self, request: NewLeaveRequest) -> Result<LeaveRequest, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, leave_type_id, date_start, date_end, description, status, requested_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.employee_id)
        .bind(request.leave_type_id)
        .bind(request.date_start)
        .bind(request.date_end)
        .bind(&request.description)
        .bind("pending")
        .bind(request.requested_at)
        .execute(&self.pool)
        .await?;

        Ok(request.into_request(result.last_insert_id()))
    }

    async fn get(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", LEAVE_COLUMNS);
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(LeaveRequest::try_from).transpose()
    }

    async fn transition_from_pending(
        &self,
        id: u64,
        status: LeaveStatus,
        decided_by: u64,
        decided_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, decided_by = ?, decided_at = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(status.as_ref())
        .bind(decided_by)
        .bind(decided_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn for_employee(&self, employee_id: u64) -> Result<Vec<LeaveRequest>, StoreError> {
        let sql = format!(
            "SELECT {} FROM leave_requests WHERE employee_id = ? ORDER BY requested_at DESC, id DESC",
            LEAVE_COLUMNS
        );
        let rows = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }

    async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, u64), StoreError> {
        let mut where_sql = String::from(" WHERE 1=1");
        if query.employee_id.is_some() {
            where_sql.push_str(" AND employee_id = ?");
        }
        if query.status.is_some() {
            where_sql.push_str(" AND status = ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(employee_id) = query.employee_id {
            count_q = count_q.bind(employee_id);
        }
        if let Some(status) = query.status {
            count_q = count_q.bind(status.as_ref().to_string());
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "SELECT {} FROM leave_requests{} ORDER BY requested_at DESC, id DESC LIMIT ? OFFSET ?",
            LEAVE_COLUMNS, where_sql
        );
        let mut data_q = sqlx::query_as::<_, LeaveRow>(&data_sql);
        if let Some(employee_id) = query.employee_id {
            data_q = data_q.bind(employee_id);
        }
        if let Some(status) = query.status {
            data_q = data_q.bind(status.as_ref().to_string());
        }
        let rows = data_q
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((convert_all(rows)?, total.max(0) as u64))
    }

    async fn approved_employees_covering(&self, date: NaiveDate) -> Result<HashSet<u64>, StoreError> {
        let ids = sqlx::query_scalar::<_, u64>(
            r#"
            SELECT DISTINCT employee_id
            FROM leave_requests
            WHERE status = 'approved'
            AND date_start <= ?
            AND date_end >= ?
            "#,
        )
        .bind(date)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn open_requests_overlapping(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM leave_requests
            WHERE employee_id = ?
            AND leave_type_id = ?
            AND status IN ('pending', 'approved')
            AND date_start <= ?
            AND date_end >= ?
            "#,
            LEAVE_COLUMNS
        );
        let rows = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(employee_id)
            .bind(leave_type_id)
            .bind(to)
            .bind(from)
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }
}

#[async_trait]
impl Roster for MySqlStore {
    async fn active_employee_count(&self) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM employees WHERE status = 'active'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn employee_exists(&self, employee_id: u64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ? LIMIT 1)",
        )
        .bind(employee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists != 0)
    }

    async fn leave_type_exists(&self, leave_type_id: u64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM leave_types WHERE id = ? LIMIT 1)",
        )
        .bind(leave_type_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists != 0)
    }
}
