use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::AttendanceError;
use crate::model::attendance::{AttendanceEvent, TodayAttendance};
use crate::state::AppState;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use utoipa::IntoParams;

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkin",
    responses(
        (status = 200, description = "Checked in", body = AttendanceEvent),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "error": "already_checked_in",
            "message": "already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 500, description = "Work schedule not configured")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let event = state
        .recorder
        .check_in(employee_id, config.company_now())
        .await?;

    Ok(HttpResponse::Ok().json(event))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkout",
    responses(
        (status = 200, description = "Checked out", body = AttendanceEvent),
        (status = 400, description = "No check-in today, or already checked out", body = Object, example = json!({
            "error": "not_checked_in_yet",
            "message": "no check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 500, description = "Work schedule not configured")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let event = state
        .recorder
        .check_out(employee_id, config.company_now())
        .await?;

    Ok(HttpResponse::Ok().json(event))
}

/// Caller's events for today with check-in / check-out flags
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's attendance", body = TodayAttendance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let today = state
        .recorder
        .today(employee_id, config.company_now())
        .await?;

    Ok(HttpResponse::Ok().json(today))
}

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// First day, inclusive (defaults to 30 days ago)
    #[param(example = "2026-01-01", value_type = Option<String>)]
    pub from: Option<NaiveDate>,
    /// Last day, inclusive (defaults to today)
    #[param(example = "2026-01-31", value_type = Option<String>)]
    pub to: Option<NaiveDate>,
}

/// Longest range a single history request may cover.
const MAX_HISTORY_DAYS: i64 = 366;
const DEFAULT_HISTORY_DAYS: i64 = 30;

/// Caller's attendance events over a date range
#[utoipa::path(
    get,
    path = "/api/attendance/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Events in chronological order", body = [AttendanceEvent]),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthUser,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let to = query.to.unwrap_or_else(|| config.company_now().date());
    let from = match query.from {
        Some(from) => from,
        None => to
            .checked_sub_signed(Duration::days(DEFAULT_HISTORY_DAYS))
            .ok_or(AttendanceError::InvalidDateRange)?,
    };
    if to.signed_duration_since(from).num_days() > MAX_HISTORY_DAYS {
        return Err(AttendanceError::InvalidDateRange.into());
    }

    let events = state.recorder.history(employee_id, from, to).await?;

    Ok(HttpResponse::Ok().json(events))
}
