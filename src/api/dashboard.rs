use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::summary::DailySummarySnapshot;
use crate::state::AppState;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Day to summarize (defaults to today)
    #[param(example = "2026-01-05", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
}

/// Company-wide on-time / late / absent counts for a day (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Daily summary", body = DailySummarySnapshot),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Work schedule not configured")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn summary(
    auth: AuthUser,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let date = query.date.unwrap_or_else(|| config.company_now().date());
    let snapshot = state.summary.summarize(date).await?;

    Ok(HttpResponse::Ok().json(snapshot))
}
