use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{App, test, web::Data};
use chrono::{FixedOffset, NaiveDate, NaiveTime, Weekday};
use serde_json::{Value, json};

use hrm_attendance::auth::jwt::generate_access_token;
use hrm_attendance::config::Config;
use hrm_attendance::model::role::Role;
use hrm_attendance::model::schedule::ScheduleConfig;
use hrm_attendance::routes;
use hrm_attendance::state::AppState;
use hrm_attendance::store::MemoryStore;

const SECRET: &str = "test-secret";

fn config() -> Config {
    Config {
        database_url: String::new(),
        jwt_secret: SECRET.into(),
        server_addr: "127.0.0.1:0".into(),
        rate_protected_per_min: 0,
        api_prefix: "/api".into(),
        company_offset: FixedOffset::east_opt(0).unwrap(),
        schedule_cache_ttl: Duration::from_secs(60),
        enforce_leave_quotas: false,
        log_dir: "logs".into(),
        log_level: "info".into(),
    }
}

fn every_day_schedule() -> ScheduleConfig {
    ScheduleConfig {
        start_work: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_work: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        late_tolerance_minutes: 10,
        leave_quotas: Default::default(),
        work_days: vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ],
    }
}

fn store() -> MemoryStore {
    MemoryStore::new()
        .with_employees(1..=5)
        .with_leave_types([1, 2])
        .with_schedule(every_day_schedule())
}

fn employee_token(employee_id: u64) -> String {
    generate_access_token(
        100 + employee_id,
        format!("emp{}", employee_id),
        Role::Employee,
        Some(employee_id),
        SECRET,
        3600,
    )
    .unwrap()
}

fn hr_token() -> String {
    generate_access_token(900, "hr".into(), Role::Hr, None, SECRET, 3600).unwrap()
}

fn admin_token() -> String {
    generate_access_token(901, "admin".into(), Role::Admin, None, SECRET, 3600).unwrap()
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

macro_rules! app {
    ($store:expr) => {{
        let state = AppState::new(Arc::new($store), Duration::from_secs(60), false);
        test::init_service(
            App::new()
                .app_data(Data::new(state))
                .app_data(Data::new(config()))
                .configure(|cfg| routes::configure_api(cfg, "/api")),
        )
        .await
    }};
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let app = app!(store());

    let req = test::TestRequest::post().uri("/api/attendance/checkin").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn second_check_in_returns_distinct_error() {
    let app = app!(store());
    let token = employee_token(1);

    let req = test::TestRequest::post()
        .uri("/api/attendance/checkin")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let event: Value = test::read_body_json(resp).await;
    assert_eq!(event["event_type"], "check_in");
    assert_eq!(event["employee_id"], 1);

    let req = test::TestRequest::post()
        .uri("/api/attendance/checkin")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "already_checked_in");
}

#[actix_web::test]
async fn check_out_flow_and_today_flags() {
    let app = app!(store());
    let token = employee_token(2);

    let req = test::TestRequest::post()
        .uri("/api/attendance/checkout")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_checked_in_yet");

    for uri in ["/api/attendance/checkin", "/api/attendance/checkout"] {
        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::post()
        .uri("/api/attendance/checkout")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["error"], "already_checked_out");

    let req = test::TestRequest::get()
        .uri("/api/attendance/today")
        .insert_header(bearer(&token))
        .to_request();
    let today: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(today["has_checked_in"], true);
    assert_eq!(today["has_checked_out"], true);
    assert_eq!(today["events"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn user_without_employee_profile_cannot_check_in() {
    let app = app!(store());

    let req = test::TestRequest::post()
        .uri("/api/attendance/checkin")
        .insert_header(bearer(&hr_token()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "no_employee_profile");
}

#[actix_web::test]
async fn missing_schedule_is_reported_as_misconfiguration() {
    let app = app!(MemoryStore::new().with_employees([1]));

    let req = test::TestRequest::post()
        .uri("/api/attendance/checkin")
        .insert_header(bearer(&employee_token(1)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "config_missing");
}

#[actix_web::test]
async fn leave_request_lifecycle() {
    let app = app!(store());
    let token = employee_token(3);

    let req = test::TestRequest::post()
        .uri("/api/leave-requests")
        .insert_header(bearer(&token))
        .set_json(json!({
            "leave_type_id": 1,
            "date_start": "2026-03-02",
            "date_end": "2026-03-04",
            "description": "family trip"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["status"], "pending");
    let id = created["id"].as_u64().unwrap();

    // employees cannot decide
    let req = test::TestRequest::patch()
        .uri(&format!("/api/leave-requests/{}/status", id))
        .insert_header(bearer(&token))
        .set_json(json!({ "status": "approved" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/leave-requests/{}/status", id))
        .insert_header(bearer(&hr_token()))
        .set_json(json!({ "status": "approved" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let decided: Value = test::read_body_json(resp).await;
    assert_eq!(decided["status"], "approved");
    assert_eq!(decided["decided_by"], 900);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/leave-requests/{}/status", id))
        .insert_header(bearer(&hr_token()))
        .set_json(json!({ "status": "rejected" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "already_decided");

    // "pending" is not a decision
    let req = test::TestRequest::patch()
        .uri(&format!("/api/leave-requests/{}/status", id))
        .insert_header(bearer(&hr_token()))
        .set_json(json!({ "status": "pending" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn reversed_leave_range_is_rejected() {
    let app = app!(store());

    let req = test::TestRequest::post()
        .uri("/api/leave-requests")
        .insert_header(bearer(&employee_token(1)))
        .set_json(json!({
            "leave_type_id": 1,
            "date_start": "2026-03-04",
            "date_end": "2026-03-02"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_date_range");
}

#[actix_web::test]
async fn my_requests_only_returns_callers_history() {
    let app = app!(store());

    for (employee_id, start) in [(1, "2026-03-02"), (1, "2026-04-06"), (2, "2026-03-02")] {
        let req = test::TestRequest::post()
            .uri("/api/leave-requests")
            .insert_header(bearer(&employee_token(employee_id)))
            .set_json(json!({ "leave_type_id": 2, "date_start": start, "date_end": start }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/leave-requests/my-requests")
        .insert_header(bearer(&employee_token(1)))
        .to_request();
    let mine: Value = test::call_and_read_body_json(&app, req).await;
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|r| r["employee_id"] == 1));

    // someone else's request is hidden from employee 1
    let req = test::TestRequest::get()
        .uri("/api/leave-requests/3")
        .insert_header(bearer(&employee_token(1)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/leave-requests?employee_id=1&per_page=1")
        .insert_header(bearer(&hr_token()))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 2);
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn dashboard_summary_reconciles_leave() {
    let app = app!(store());
    let date = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();

    let req = test::TestRequest::post()
        .uri("/api/leave-requests")
        .insert_header(bearer(&employee_token(4)))
        .set_json(json!({ "leave_type_id": 1, "date_start": "2026-03-02", "date_end": "2026-03-06" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/leave-requests/{}/status", created["id"]))
        .insert_header(bearer(&hr_token()))
        .set_json(json!({ "status": "approved" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/dashboard/summary?date={}", date))
        .insert_header(bearer(&employee_token(4)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "forbidden");
    assert_eq!(body["message"], "HR/Admin only");

    let req = test::TestRequest::get()
        .uri(&format!("/api/dashboard/summary?date={}", date))
        .insert_header(bearer(&hr_token()))
        .to_request();
    let snapshot: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snapshot["total_employees"], 5);
    assert_eq!(snapshot["on_leave_count"], 1);
    assert_eq!(snapshot["absent_count"], 4);
    assert_eq!(snapshot["on_time_count"], 0);
}

#[actix_web::test]
async fn schedule_update_is_admin_only_and_validated() {
    let app = app!(store());
    let update = json!({
        "start_work": "08:00:00",
        "end_work": "16:30:00",
        "late_tolerance_minutes": 5,
        "leave_quotas": { "1": 12 },
        "work_days": ["Mon", "Tue", "Wed", "Thu", "Fri"]
    });

    let req = test::TestRequest::put()
        .uri("/api/schedule-config")
        .insert_header(bearer(&hr_token()))
        .set_json(&update)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "forbidden");

    let req = test::TestRequest::put()
        .uri("/api/schedule-config")
        .insert_header(bearer(&admin_token()))
        .set_json(&update)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/schedule-config")
        .insert_header(bearer(&employee_token(1)))
        .to_request();
    let current: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(current["start_work"], "08:00:00");
    assert_eq!(current["late_tolerance_minutes"], 5);

    let req = test::TestRequest::put()
        .uri("/api/schedule-config")
        .insert_header(bearer(&admin_token()))
        .set_json(json!({
            "start_work": "18:00:00",
            "end_work": "09:00:00",
            "late_tolerance_minutes": 0,
            "work_days": ["Mon"]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_schedule");
}

#[actix_web::test]
async fn history_near_the_calendar_minimum_is_rejected() {
    let app = app!(store());
    // the default 30-day window would start before the first representable day
    let min = NaiveDate::MIN;

    let req = test::TestRequest::get()
        .uri(&format!("/api/attendance/history?to={}", min))
        .insert_header(bearer(&employee_token(1)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_date_range");

    // an explicit lower bound needs no arithmetic
    let req = test::TestRequest::get()
        .uri(&format!("/api/attendance/history?from={}&to={}", min, min))
        .insert_header(bearer(&employee_token(1)))
        .to_request();
    let events: Value = test::call_and_read_body_json(&app, req).await;
    assert!(events.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn history_window_longer_than_a_year_is_rejected() {
    let app = app!(store());

    let req = test::TestRequest::get()
        .uri("/api/attendance/history?from=2025-01-01&to=2026-06-01")
        .insert_header(bearer(&employee_token(1)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/attendance/history?to=2026-03-31")
        .insert_header(bearer(&employee_token(1)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn leave_list_page_past_addressable_range_is_rejected() {
    let app = app!(store());

    let req = test::TestRequest::get()
        .uri(&format!("/api/leave-requests?page={}", u64::MAX))
        .insert_header(bearer(&hr_token()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "page_out_of_range");

    // large but addressable pages are simply empty, and echo back untruncated
    let page = u64::from(u32::MAX) + 1;
    let req = test::TestRequest::get()
        .uri(&format!("/api/leave-requests?page={}&per_page=1", page))
        .insert_header(bearer(&hr_token()))
        .to_request();
    let listing: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listing["page"], page);
    assert_eq!(listing["total"], 0);
    assert!(listing["data"].as_array().unwrap().is_empty());
}
