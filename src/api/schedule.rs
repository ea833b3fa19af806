use crate::auth::auth::AuthUser;
use crate::model::schedule::{ScheduleConfig, ScheduleUpdate};
use crate::state::AppState;
use actix_web::{HttpResponse, Responder, web};

/// Active work schedule
#[utoipa::path(
    get,
    path = "/api/schedule-config",
    responses(
        (status = 200, description = "Active work schedule", body = ScheduleConfig),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Work schedule not configured", body = Object, example = json!({
            "error": "config_missing",
            "message": "work schedule has not been configured"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Schedule"
)]
pub async fn get_schedule(
    _auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let config = state.schedule.get().await?;
    Ok(HttpResponse::Ok().json(config))
}

/// Replace the work schedule (Admin)
#[utoipa::path(
    put,
    path = "/api/schedule-config",
    request_body = ScheduleUpdate,
    responses(
        (status = 200, description = "Schedule replaced", body = ScheduleConfig),
        (status = 400, description = "Invalid schedule", body = Object, example = json!({
            "error": "invalid_schedule",
            "message": "invalid work schedule: start_work must be before end_work"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Schedule"
)]
pub async fn update_schedule(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<ScheduleUpdate>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let config = state.schedule.update(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(config))
}
