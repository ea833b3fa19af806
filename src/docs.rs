use crate::api::leave_request::{CreateLeave, DecideLeave, LeaveListResponse};
use crate::model::attendance::{AttendanceEvent, AttendanceStatus, EventType, TodayAttendance};
use crate::model::leave_request::{LeaveDecision, LeaveRequest, LeaveStatus};
use crate::model::schedule::{ScheduleConfig, ScheduleUpdate};
use crate::model::summary::DailySummarySnapshot;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance & Leave API",
        version = "1.0.0",
        description = r#"
## Attendance & Leave Adjudication

Daily presence tracking and leave approval for the HRM platform.

### Key Features
- **Attendance**
  - One check-in and one check-out per employee per day
  - Status resolved against the company work schedule (on time, late, early)
- **Leave**
  - Employees apply for leave; HR/Admin approve or reject once
- **Dashboard**
  - Daily on-time / late / absent counts, reconciled with approved leave
- **Schedule**
  - Work hours, late tolerance, work days and leave quotas

### Security
All endpoints except `/health` require a **JWT Bearer** access token
issued by the identity service.

### Errors
Failures return `{"error": "<code>", "message": "<text>"}` with a distinct
code per failure kind (e.g. `already_checked_in`, `not_checked_in_yet`).
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today,
        crate::api::attendance::history,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::decide_leave,
        crate::api::leave_request::my_requests,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::leave_list,

        crate::api::dashboard::summary,

        crate::api::schedule::get_schedule,
        crate::api::schedule::update_schedule
    ),
    components(
        schemas(
            AttendanceEvent,
            AttendanceStatus,
            EventType,
            TodayAttendance,
            LeaveRequest,
            LeaveStatus,
            LeaveDecision,
            CreateLeave,
            DecideLeave,
            LeaveListResponse,
            DailySummarySnapshot,
            ScheduleConfig,
            ScheduleUpdate
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Check-in / check-out APIs"),
        (name = "Leave", description = "Leave request lifecycle APIs"),
        (name = "Dashboard", description = "Daily attendance summary"),
        (name = "Schedule", description = "Work schedule configuration"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
