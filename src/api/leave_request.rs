use crate::auth::auth::AuthUser;
use crate::error::AttendanceError;
use crate::model::leave_request::{LeaveDecision, LeaveQuery, LeaveRequest, LeaveStatus};
use crate::service::LeaveApplication;
use crate::state::AppState;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date_start: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub date_end: NaiveDate,
    #[schema(example = "family trip")]
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DecideLeave {
    #[schema(example = "approved")]
    pub status: LeaveDecision,
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "data": [
        {
            "id": 1,
            "employee_id": 1000,
            "leave_type_id": 2,
            "date_start": "2026-01-01",
            "date_end": "2026-01-03",
            "description": "family trip",
            "status": "pending",
            "requested_at": "2026-01-01T00:00:00Z",
            "decided_at": null,
            "decided_by": null
        }
    ],
    "page": 1,
    "per_page": 10,
    "total": 1
}))]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: u64,
}

const MAX_PER_PAGE: u64 = 100;

#[derive(Deserialize, IntoParams)]
pub struct LeaveFilter {
    /// Filter by employee ID
    #[param(example = 123)]
    pub employee_id: Option<u64>,
    /// Filter by leave status
    #[param(example = "pending", value_type = Option<String>)]
    pub status: Option<LeaveStatus>,
    /// Pagination page number (start with 1)
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[param(example = 10)]
    pub per_page: Option<u64>,
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave-requests",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid date range, unknown leave type or quota exceeded", body = Object, example = json!({
            "error": "invalid_date_range",
            "message": "date_end cannot be before date_start"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let payload = payload.into_inner();

    let request = state
        .leave
        .create(
            LeaveApplication {
                employee_id,
                leave_type_id: payload.leave_type_id,
                date_start: payload.date_start,
                date_end: payload.date_end,
                description: payload.description,
            },
            Utc::now(),
        )
        .await?;

    Ok(HttpResponse::Created().json(request))
}

/* =========================
Approve / reject leave (HR/Admin)
========================= */
#[utoipa::path(
    patch,
    path = "/api/leave-requests/{leave_id}/status",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to decide")
    ),
    request_body = DecideLeave,
    responses(
        (status = 200, description = "Leave request decided", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already decided", body = Object, example = json!({
            "error": "already_decided",
            "message": "leave request 1 has already been decided"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn decide_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<DecideLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let request = state
        .leave
        .decide(leave_id, payload.status, auth.user_id, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(request))
}

/// Caller's own leave history, newest first
#[utoipa::path(
    get,
    path = "/api/leave-requests/my-requests",
    responses(
        (status = 200, description = "Caller's leave requests", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_requests(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let requests = state.leave.for_employee(employee_id).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// Leave request details; HR/Admin or the requesting employee
#[utoipa::path(
    get,
    path = "/api/leave-requests/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let request = state.leave.get(path.into_inner()).await?;

    let is_owner = auth.employee_id == Some(request.employee_id);
    if !is_owner {
        auth.require_hr_or_admin()?;
    }

    Ok(HttpResponse::Ok().json(request))
}

/// Paginated leave list for HR/Admin
#[utoipa::path(
    get,
    path = "/api/leave-requests",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Page out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).clamp(1, MAX_PER_PAGE);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1)
        .checked_mul(per_page)
        .ok_or(AttendanceError::PageOutOfRange { page })?;

    let (data, total) = state
        .leave
        .list(&LeaveQuery {
            employee_id: query.employee_id,
            status: query.status,
            limit: per_page,
            offset,
        })
        .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page,
        per_page,
        total,
    }))
}
