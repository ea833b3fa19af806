//! Error taxonomy for the attendance and leave core.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AttendanceError>;

/// Failures surfaced to callers of the attendance and leave operations.
///
/// Every variant maps to its own machine-readable code so clients can
/// tell a duplicate check-in from a missing one.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("work schedule has not been configured")]
    ConfigMissing,

    #[error("invalid work schedule: {0}")]
    InvalidSchedule(String),

    #[error("already checked in today")]
    AlreadyCheckedIn,

    #[error("no check-in found for today")]
    NotCheckedInYet,

    #[error("already checked out today")]
    AlreadyCheckedOut,

    #[error("date_end cannot be before date_start")]
    InvalidDateRange,

    #[error("leave request {0} has already been decided")]
    AlreadyDecided(u64),

    #[error("leave request {0} not found")]
    LeaveRequestNotFound(u64),

    #[error("employee {0} does not exist")]
    UnknownEmployee(u64),

    #[error("leave type {0} does not exist")]
    UnknownLeaveType(u64),

    #[error("leave quota exceeded for leave type {leave_type_id}: {requested} days requested, {remaining} remaining")]
    QuotaExceeded {
        leave_type_id: u64,
        requested: i64,
        remaining: i64,
    },

    #[error("caller has no employee profile")]
    NoEmployeeProfile,

    #[error("{0} only")]
    Forbidden(&'static str),

    #[error("page {page} is out of range")]
    PageOutOfRange { page: u64 },

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AttendanceError {
    /// Stable identifier used in the `error` field of JSON responses.
    pub fn code(&self) -> &'static str {
        match self {
            AttendanceError::ConfigMissing => "config_missing",
            AttendanceError::InvalidSchedule(_) => "invalid_schedule",
            AttendanceError::AlreadyCheckedIn => "already_checked_in",
            AttendanceError::NotCheckedInYet => "not_checked_in_yet",
            AttendanceError::AlreadyCheckedOut => "already_checked_out",
            AttendanceError::InvalidDateRange => "invalid_date_range",
            AttendanceError::AlreadyDecided(_) => "already_decided",
            AttendanceError::LeaveRequestNotFound(_) => "leave_request_not_found",
            AttendanceError::UnknownEmployee(_) => "unknown_employee",
            AttendanceError::UnknownLeaveType(_) => "unknown_leave_type",
            AttendanceError::QuotaExceeded { .. } => "quota_exceeded",
            AttendanceError::NoEmployeeProfile => "no_employee_profile",
            AttendanceError::Forbidden(_) => "forbidden",
            AttendanceError::PageOutOfRange { .. } => "page_out_of_range",
            AttendanceError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::ConfigMissing => StatusCode::INTERNAL_SERVER_ERROR,
            AttendanceError::InvalidSchedule(_)
            | AttendanceError::AlreadyCheckedIn
            | AttendanceError::NotCheckedInYet
            | AttendanceError::AlreadyCheckedOut
            | AttendanceError::InvalidDateRange
            | AttendanceError::UnknownEmployee(_)
            | AttendanceError::UnknownLeaveType(_)
            | AttendanceError::QuotaExceeded { .. }
            | AttendanceError::PageOutOfRange { .. } => StatusCode::BAD_REQUEST,
            AttendanceError::AlreadyDecided(_) => StatusCode::CONFLICT,
            AttendanceError::LeaveRequestNotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::NoEmployeeProfile | AttendanceError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            AttendanceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // store details stay in the logs
        let message = match self {
            AttendanceError::StoreUnavailable(_) => "Service temporarily unavailable".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "error": self.code(),
            "message": message,
        }))
    }
}

/// Failures reported by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write collided with a uniqueness constraint.
    #[error("duplicate record")]
    Duplicate,

    #[error("{0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            // MySQL integrity constraint violation
            if db_err.code().as_deref() == Some("23000") {
                return StoreError::Duplicate;
            }
        }
        StoreError::Unavailable(e.to_string())
    }
}

impl From<StoreError> for AttendanceError {
    fn from(e: StoreError) -> Self {
        AttendanceError::StoreUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_state_conflicts_are_bad_requests() {
        for err in [
            AttendanceError::AlreadyCheckedIn,
            AttendanceError::NotCheckedInYet,
            AttendanceError::AlreadyCheckedOut,
            AttendanceError::InvalidDateRange,
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn terminal_leave_conflict_is_409() {
        assert_eq!(
            AttendanceError::AlreadyDecided(7).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn codes_are_distinct_per_attendance_failure() {
        let codes = [
            AttendanceError::AlreadyCheckedIn.code(),
            AttendanceError::NotCheckedInYet.code(),
            AttendanceError::AlreadyCheckedOut.code(),
        ];
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
        assert_ne!(codes[0], codes[2]);
    }

    #[test]
    fn role_denial_is_403_with_its_own_code() {
        let err = AttendanceError::Forbidden("HR/Admin");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.code(), "forbidden");
        assert_eq!(err.to_string(), "HR/Admin only");
        assert_ne!(err.code(), AttendanceError::NoEmployeeProfile.code());
    }

    #[test]
    fn store_failures_map_to_unavailable() {
        let err: AttendanceError = StoreError::Unavailable("pool timed out".into()).into();
        assert!(matches!(err, AttendanceError::StoreUnavailable(_)));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
