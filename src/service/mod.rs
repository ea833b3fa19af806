pub mod leave;
pub mod policy;
pub mod recorder;
pub mod schedule;
pub mod status;
pub mod summary;

pub use leave::{LeaveApplication, LeaveLifecycle};
pub use policy::{AnnualQuota, LeavePolicy, Unrestricted};
pub use recorder::AttendanceRecorder;
pub use schedule::ScheduleService;
pub use summary::DailySummaryAggregator;
