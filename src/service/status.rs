//! Time-based status of an attendance event. Pure; no I/O.

use chrono::{Duration, NaiveDateTime};

use crate::model::attendance::{AttendanceStatus, EventType};
use crate::model::schedule::ScheduleConfig;

/// On time up to and including `start_work + late_tolerance_minutes`.
pub fn resolve_check_in(config: &ScheduleConfig, now: NaiveDateTime) -> AttendanceStatus {
    let tolerance = Duration::minutes(i64::from(config.late_tolerance_minutes));
    let (deadline, wrapped_secs) = config.start_work.overflowing_add_signed(tolerance);

    // window runs past midnight: the rest of the day is inside it
    if wrapped_secs != 0 || now.time() <= deadline {
        AttendanceStatus::OnTime
    } else {
        AttendanceStatus::Late
    }
}

/// Early before `end_work`; leaving at or after it is on time.
pub fn resolve_check_out(config: &ScheduleConfig, now: NaiveDateTime) -> AttendanceStatus {
    if now.time() < config.end_work {
        AttendanceStatus::Early
    } else {
        AttendanceStatus::OnTime
    }
}

pub fn resolve(config: &ScheduleConfig, event_type: EventType, now: NaiveDateTime) -> AttendanceStatus {
    match event_type {
        EventType::CheckIn => resolve_check_in(config, now),
        EventType::CheckOut => resolve_check_out(config, now),
    }
}
